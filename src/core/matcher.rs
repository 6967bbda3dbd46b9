//! Neighbor matching
//!
//! Brute force: every focus endpoint is compared with every endpoint of a
//! bordering state. All hits within tolerance are kept, since the resolver
//! needs the full list to pick between them.

use crate::core::borders::StateCode;
use crate::core::coord::{great_circle_feet, Coord};
use crate::core::endpoint::{Endpoint, EndpointSet};

/// A neighbor endpoint within tolerance of a focus endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub coord: Coord,
    pub state: StateCode,
    pub distance_ft: f64,
    pub signature: String,
}

/// A focus-state endpoint and the candidates found for it so far
#[derive(Debug, Clone)]
pub struct FocusEntry {
    pub endpoint: Endpoint,
    pub candidates: Vec<Candidate>,
}

impl FocusEntry {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            candidates: Vec::new(),
        }
    }
}

/// Turn a loaded focus state into entries with empty candidate lists
pub fn focus_entries(set: &EndpointSet) -> Vec<FocusEntry> {
    set.endpoints().iter().cloned().map(FocusEntry::new).collect()
}

/// Append to each focus entry every neighbor endpoint within `tolerance_ft`
///
/// Returns the number of candidates added.
pub fn match_neighbor(focus: &mut [FocusEntry], neighbor: &EndpointSet, tolerance_ft: f64) -> usize {
    let mut added = 0;
    for entry in focus.iter_mut() {
        for other in neighbor.endpoints() {
            let distance_ft = great_circle_feet(entry.endpoint.coord, other.coord);
            if distance_ft <= tolerance_ft {
                entry.candidates.push(Candidate {
                    coord: other.coord,
                    state: neighbor.state.clone(),
                    distance_ft,
                    signature: other.signature.clone(),
                });
                added += 1;
            }
        }
    }
    added
}
