//! Draft persistence contract. Storage itself belongs to the integrating
//! application; the engine only consumes it to seed initial values.

use crate::compiler::CompiledSchema;
use crate::error::DraftError;
use crate::model::FormValues;

/// Saves and restores in-progress form values by form id.
pub trait DraftStore {
    fn save(&self, form_id: &str, values: &FormValues) -> Result<(), DraftError>;
    fn load(&self, form_id: &str) -> Result<Option<FormValues>, DraftError>;
    fn clear(&self, form_id: &str) -> Result<(), DraftError>;
}

/// Defaults overlaid with the stored draft, restricted to the schema's fields.
///
/// A failing store is logged and treated as having no draft.
pub fn initial_values(
    schema: &CompiledSchema,
    store: &dyn DraftStore,
    form_id: &str,
) -> FormValues {
    let mut values = schema.default_values();
    match store.load(form_id) {
        Ok(Some(draft)) => values.extend(schema.retain_known(&draft)),
        Ok(None) => {}
        Err(e) => log::warn!("Could not load draft for form '{}': {}", form_id, e),
    }
    values
}
