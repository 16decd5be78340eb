pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const SCROLL: &str = "📜";
    pub const MAP: &str = "🗺️";
    pub const STAR: &str = "⭐";
}
