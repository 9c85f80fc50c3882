use std::sync::RwLock;

/// 整页跳转
pub trait Navigator: Send + Sync {
    /// 当前所在路径
    fn current_path(&self) -> String;

    fn redirect(&self, path: &str);
}

#[derive(Debug)]
struct NavigationState {
    current: String,
    history: Vec<String>,
}

/// 记录当前路径与跳转历史
#[derive(Debug)]
pub struct MemoryNavigator {
    state: RwLock<NavigationState>,
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::at("/")
    }
}

impl MemoryNavigator {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(NavigationState {
                current: path.into(),
                history: Vec::new(),
            }),
        }
    }

    /// 用户自行导航，不计入跳转历史
    pub fn set_path(&self, path: impl Into<String>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.current = path.into();
    }

    /// 所有 redirect 调用，按先后顺序
    pub fn history(&self) -> Vec<String> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .history
            .clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .current
            .clone()
    }

    fn redirect(&self, path: &str) {
        tracing::info!("Redirecting to {}", path);
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.current = path.to_string();
        state.history.push(path.to_string());
    }
}
