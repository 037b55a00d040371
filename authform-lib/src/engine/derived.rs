//! Artifacts derived from a form configuration

use std::sync::Arc;

use crate::error::ConfigError;
use crate::field::Fingerprint;
use crate::field::FormConfiguration;
use crate::layout::LayoutPlan;
use crate::schema;
use crate::schema::ValidationSchema;

/// Schema and layout computed for one configuration, keyed by its
/// fingerprint.
#[derive(Debug, Clone)]
pub(crate) struct Derived {
    pub(crate) config: Arc<FormConfiguration>,
    pub(crate) fingerprint: Fingerprint,
    pub(crate) schema: Arc<ValidationSchema>,
    pub(crate) layout: LayoutPlan,
}

impl Derived {
    /// Normalizes `config` and derives its artifacts.
    ///
    /// An override schema replaces the derived one, but the configuration
    /// itself is still checked.
    pub(crate) fn compute(
        config: FormConfiguration,
        schema_override: Option<&Arc<ValidationSchema>>,
    ) -> Result<Self, ConfigError> {
        let config = config.or_default().normalized();
        let schema = match schema_override {
            Some(schema) => {
                schema::check(&config)?;
                Arc::clone(schema)
            }
            None => Arc::new(schema::build(&config)?),
        };
        Ok(Self {
            fingerprint: config.fingerprint(),
            layout: LayoutPlan::for_config(&config),
            config: Arc::new(config),
            schema,
        })
    }

    /// Returns `true` if `config` would derive the same artifacts.
    pub(crate) fn matches(&self, config: &FormConfiguration) -> bool {
        config.clone().or_default().normalized().fingerprint() == self.fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;
    use crate::schema::FieldRule;

    #[test]
    fn test_empty_config_uses_default() {
        let derived = Derived::compute(FormConfiguration::new(Vec::new()), None).unwrap();
        assert_eq!(derived.config.len(), 2);
        assert_eq!(derived.schema.len(), 2);
        assert!(derived.matches(&FormConfiguration::default()));
    }

    #[test]
    fn test_override_wins_but_config_is_checked() {
        let schema = Arc::new(ValidationSchema::new().field("code", FieldRule::new().required("Need a code")));
        let config = FormConfiguration::new(vec![FieldDescriptor::text("code"), FieldDescriptor::email("email")]);
        let derived = Derived::compute(config, Some(&schema)).unwrap();
        assert_eq!(derived.schema.field_names().collect::<Vec<_>>(), ["code"]);

        let duplicate = FormConfiguration::new(vec![FieldDescriptor::text("a"), FieldDescriptor::text("a")]);
        assert!(matches!(
            Derived::compute(duplicate, Some(&schema)),
            Err(ConfigError::DuplicateName { .. })
        ));
    }
}
