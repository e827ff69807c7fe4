use serde::{Deserialize, Serialize};

/// One requested edit: replace `specific_old_text` with `specific_new_text`
/// at the place where it occurs inside `contextual_old_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    pub contextual_old_text: String,
    pub specific_old_text: String,
    pub specific_new_text: String,
    #[serde(default)]
    pub reason_for_change: String,
}

impl EditRequest {
    pub fn new(
        contextual_old_text: impl Into<String>,
        specific_old_text: impl Into<String>,
        specific_new_text: impl Into<String>,
        reason_for_change: impl Into<String>,
    ) -> Self {
        Self {
            contextual_old_text: contextual_old_text.into(),
            specific_old_text: specific_old_text.into(),
            specific_new_text: specific_new_text.into(),
            reason_for_change: reason_for_change.into(),
        }
    }
}
