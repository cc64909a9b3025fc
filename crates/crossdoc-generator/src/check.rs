//! Reference audit without rendering.

use crossdoc_core::{Config, DocumentationModel, Entity, Property};
use tracing::info;

use crate::{
    resolver::{CrossReferenceResolver, MissingReport},
    types::TypeRegistry,
};

/// Outcome of resolving every reference in a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceAudit {
    /// Type expressions and descriptions checked.
    pub checked: usize,

    /// References that would render as missing links.
    pub missing: Vec<MissingReport>,
}

impl ReferenceAudit {
    /// Whether every reference resolved.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Resolve every type expression and inline reference of `model` the way a
/// build would, without touching the file system.
pub fn audit_references(model: &DocumentationModel, config: &Config) -> ReferenceAudit {
    let types = TypeRegistry::new();
    if let Some(external) = &config.external_types {
        types.merge_external(external);
    }
    let resolver = CrossReferenceResolver::new(&model.symbol_index, &types);
    let mut checked = 0;

    for class in &model.classes {
        let context = format!("(in {})", class.defined_in.as_deref().unwrap_or_default());
        checked += audit_entity(&resolver, class, Some(&context));
    }

    for entity in model
        .guides
        .iter()
        .chain(&model.pages)
        .chain(&model.restapis)
        .chain(&model.modules)
        .chain(&model.features)
        .chain(&model.files)
    {
        checked += audit_entity(&resolver, entity, None);
    }

    let audit = ReferenceAudit {
        checked,
        missing: resolver.missing_reports(),
    };
    info!(checked = audit.checked, missing = audit.missing.len(), "reference audit complete");
    audit
}

fn audit_entity(
    resolver: &CrossReferenceResolver<'_>,
    entity: &Entity,
    context: Option<&str>,
) -> usize {
    let mut checked = 0;
    let mut link = |expression: &str| {
        resolver.type_link("./", expression, context);
        checked += 1;
    };

    entity.extends.iter().for_each(|e| link(e));
    for property in &entity.properties {
        for expression in property_types(property) {
            link(expression);
        }
    }

    let descriptions = std::iter::once(&entity.description)
        .chain(entity.content.as_ref())
        .chain(entity.properties.iter().flat_map(|p| {
            std::iter::once(&p.description)
                .chain(p.params.iter().map(|param| &param.description))
                .chain(p.returns.iter().map(|r| &r.description))
        }));
    for description in descriptions {
        resolver.convert_links("./", description);
        checked += 1;
    }

    checked
}

fn property_types(property: &Property) -> impl Iterator<Item = &str> {
    property
        .types
        .iter()
        .chain(property.params.iter().flat_map(|p| &p.types))
        .chain(property.returns.iter().flat_map(|r| &r.types))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use crossdoc_core::{Location, Param};

    use super::*;
    use crate::resolver::MissingReference;

    #[test]
    fn test_audit_reports_missing_references() {
        let mut model = DocumentationModel::default();
        model
            .symbol_index
            .insert("Widget", Location::new("classes/widget", "widget"));
        model.symbol_index.mark_ambiguous("init");

        let mut class = Entity::new("Widget", "classes/widget");
        class.defined_in = Some("lib/widget.js".to_string());
        class.extends = vec!["Base".to_string()];
        class.properties.push(Property {
            name: "attach".to_string(),
            params: vec![Param {
                name: "parent".to_string(),
                types: vec!["Widget".to_string()],
                ..Param::default()
            }],
            description: "Calls [[#init]].".to_string(),
            ..Property::default()
        });
        model.classes.push(class);

        let audit = audit_references(&model, &Config::default());

        assert!(!audit.is_clean());
        assert_eq!(audit.missing.len(), 2);
        assert_eq!(audit.missing[0].reference, MissingReference::Missing("Base".to_string()));
        assert_eq!(audit.missing[0].context.as_deref(), Some("(in lib/widget.js)"));
        assert_eq!(audit.missing[1].reference, MissingReference::Ambiguous("init".to_string()));
        // extends + param type + entity, property, param descriptions
        assert_eq!(audit.checked, 5);
    }

    #[test]
    fn test_audit_uses_external_types() {
        let mut model = DocumentationModel::default();
        let mut module = Entity::new("io", "modules/io");
        module.properties.push(Property {
            name: "read".to_string(),
            types: vec!["Buffer".to_string()],
            ..Property::default()
        });
        model.modules.push(module);

        let mut config = Config::default();
        let mut map = std::collections::BTreeMap::new();
        map.insert("Buffer".to_string(), "https://nodejs.org/api/buffer.html".to_string());
        config.external_types = Some(crossdoc_core::ExternalTypes::Inline(map));

        let audit = audit_references(&model, &config);

        assert!(audit.is_clean());
    }
}
