//! Match resolution
//!
//! When a focus endpoint has several candidates, the one sharing its attribute
//! signature gets a 150 ft head start. A closer candidate with different
//! attributes still wins when it is more than 150 ft closer: on the NH-MA
//! border the right dangle was a few feet away with different attributes while
//! a matching one sat 200+ ft off. Ties keep the first candidate.

use crate::core::matcher::Candidate;

/// Distance credited to a candidate whose signature matches the focus endpoint
pub const SIGNATURE_BONUS_FT: f64 = 150.0;

/// Starting score; larger than any usable tolerance
const INITIAL_CLOSEST_FT: f64 = 9999.0;

/// Pick the single candidate to connect to, if any
pub fn resolve<'a>(focus_signature: &str, candidates: &'a [Candidate]) -> Option<&'a Candidate> {
    match candidates {
        [] => None,
        [only] => Some(only),
        _ => {
            let mut closest_feet = INITIAL_CLOSEST_FT;
            let mut index = 0;
            for (i, candidate) in candidates.iter().enumerate() {
                if candidate.signature == focus_signature {
                    let effective = candidate.distance_ft - SIGNATURE_BONUS_FT;
                    if effective < closest_feet {
                        closest_feet = effective;
                        index = i;
                    }
                }
                if candidate.distance_ft < closest_feet {
                    closest_feet = candidate.distance_ft;
                    index = i;
                }
            }
            candidates.get(index)
        }
    }
}
