mod navigator;
mod token;

pub use navigator::{MemoryNavigator, Navigator};
pub use token::{Claims, JwtInspector, TokenInspector};

/// 当前路径是否包含任一片段
pub fn path_targets_any(path: &str, fragments: &[&str]) -> bool {
    fragments.iter().any(|fragment| path.contains(fragment))
}
