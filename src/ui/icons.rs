pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const STATS: &str = "📊";
    pub const LINK: &str = "🔗";
    pub const ARTICLE: &str = "📄";
    pub const GLOBE: &str = "🌐";
    pub const DATABASE: &str = "🗄️";
    pub const RIGHT: &str = "➡️";
    pub const EMPTY: &str = "∅";
}
