use haflow_core::EntryKind;

/// Fill colours per node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub automation: String,
    pub trigger: String,
    pub condition: String,
    pub action: String,
    pub background: String,
    pub text: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            automation: "#4a90e2".to_string(),
            trigger: "#50c878".to_string(),
            condition: "#ff9f43".to_string(),
            action: "#ee5a6f".to_string(),
            background: "#1e1e1e".to_string(),
            text: "#ffffff".to_string(),
        }
    }
}

impl Theme {
    pub fn fill_for(&self, kind: EntryKind) -> &str {
        match kind {
            EntryKind::Trigger => &self.trigger,
            EntryKind::Condition => &self.condition,
            EntryKind::Action => &self.action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub theme: Theme,
    /// Emit a `<style>` block inside the HTML container. Hosts that ship their own stylesheet
    /// turn this off.
    pub embed_style: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            embed_style: true,
        }
    }
}

impl RenderOptions {
    pub fn without_style(mut self) -> Self {
        self.embed_style = false;
        self
    }
}
