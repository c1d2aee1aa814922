use shimmer_core::DisplayHandle;

/// Strategy for combining native and emulated discovery results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Native results first, emulated results always appended after them.
    AlwaysAppendEmulated,
    /// Native results alone when any exist, emulated results otherwise.
    #[default]
    PreferNativeWhenPresent,
}

/// Pure and order-preserving: native entries always precede emulated ones
/// when both appear.
pub fn merge(
    native: Vec<DisplayHandle>,
    emulated: &[DisplayHandle],
    policy: MergePolicy,
) -> Vec<DisplayHandle> {
    match policy {
        MergePolicy::AlwaysAppendEmulated => {
            let mut merged = native;
            merged.extend(emulated.iter().cloned());
            merged
        }
        MergePolicy::PreferNativeWhenPresent => {
            if native.is_empty() {
                emulated.to_vec()
            } else {
                native
            }
        }
    }
}
