//! $uid(root)

use crate::registry::function::{AnonymizerFunction, FunctionContext, FunctionResult};
use crate::registry::functions::hashing::normalize_root;
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};
use chrono::Utc;
use parking_lot::Mutex;

/// Last millisecond a UID was minted in, and how many were minted in it
static CLOCK: Mutex<(i64, u64)> = parking_lot::const_mutex((-1, 0));

/// $uid() function - a new UID from the current time
pub struct UidFunction;

/// Mint `root` + milliseconds since the epoch + `.` + a per-millisecond counter
pub fn new_uid(root: &str) -> String {
    let now = Utc::now().timestamp_millis();
    let counter = {
        let mut clock = CLOCK.lock();
        if clock.0 != now {
            *clock = (now, 0);
        }
        let counter = clock.1;
        clock.1 += 1;
        counter
    };
    format!("{}{now}.{counter}", normalize_root(root))
}

impl AnonymizerFunction for UidFunction {
    fn name(&self) -> &str {
        "$uid"
    }
    fn human_friendly_name(&self) -> &str {
        "New UID"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$uid",
                vec![ParameterInfo::required("root", ParameterKind::Text)],
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Creates a new UID under root from the current time in milliseconds and a counter that keeps UIDs minted in the same millisecond distinct."
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        Ok(new_uid(&args[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uids_are_distinct_and_rooted() {
        let uids: HashSet<String> = (0..200).map(|_| new_uid("1.2.3")).collect();
        assert_eq!(uids.len(), 200);
        assert!(uids.iter().all(|u| u.starts_with("1.2.3.")));
    }
}
