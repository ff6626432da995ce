//! $hashuid(root, uid)

use super::md5_decimal;
use crate::registry::function::{AnonymizerFunction, FunctionContext, FunctionResult, truncate};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// Longest UID the function produces
pub const MAX_UID_LENGTH: usize = 64;

/// $hashuid() function - deterministic replacement UID under a root
pub struct HashUidFunction;

/// Append `.` to a non-empty root that lacks it
pub fn normalize_root(root: &str) -> String {
    let root = root.trim();
    if root.is_empty() || root.ends_with('.') {
        root.to_string()
    } else {
        format!("{root}.")
    }
}

impl AnonymizerFunction for HashUidFunction {
    fn name(&self) -> &str {
        "$hashuid"
    }
    fn human_friendly_name(&self) -> &str {
        "Hash UID"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$hashuid",
                vec![
                    ParameterInfo::required("root", ParameterKind::Text),
                    ParameterInfo::required("uid", ParameterKind::Text),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Replaces a UID with root followed by the decimal MD5 digest of the original UID, limited to 64 characters. A digest starting with 0 is prefixed with 9 so no UID component has a leading zero."
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        let root = normalize_root(&args[0]);
        let digest = md5_decimal(args[1].trim());
        let extra = if digest.starts_with('0') { "9" } else { "" };
        Ok(truncate(
            format!("{root}{extra}{digest}"),
            Some(MAX_UID_LENGTH),
        ))
    }
}
