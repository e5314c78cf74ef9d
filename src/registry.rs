//! Model registry: resource code to model definition lookup. Immutable after startup.

use crate::case::is_resource_code;
use crate::config::ModelDef;
use crate::error::AppError;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One admin menu entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MenuItem {
    pub code: String,
    pub label: String,
    pub fields: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ModelRegistry {
    models: Vec<ModelDef>,
    by_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    excluded: HashSet<String>,
}

impl ModelRegistry {
    pub fn new(models: Vec<ModelDef>, excluded: HashSet<String>) -> Self {
        let by_code = models
            .iter()
            .enumerate()
            .map(|(i, m)| (m.code.clone(), i))
            .collect();
        let by_name = models
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        ModelRegistry {
            models,
            by_code,
            by_name,
            excluded,
        }
    }

    /// Resolve a kebab-case resource code. Excluded and unknown models are not found.
    pub fn resolve(&self, code: &str) -> Result<&ModelDef, AppError> {
        if !is_resource_code(code) {
            return Err(AppError::NotFound(code.to_string()));
        }
        self.by_code
            .get(code)
            .map(|&i| &self.models[i])
            .filter(|m| !self.excluded.contains(&m.name))
            .ok_or_else(|| AppError::NotFound(code.to_string()))
    }

    /// Lookup by model name, ignoring exclusions. Used to follow relations to models hidden from the menu.
    pub fn get(&self, name: &str) -> Option<&ModelDef> {
        self.by_name.get(name).map(|&i| &self.models[i])
    }

    /// Every visible model, in declaration order.
    pub fn menu(&self) -> Vec<MenuItem> {
        self.models
            .iter()
            .filter(|m| !self.excluded.contains(&m.name))
            .map(|m| MenuItem {
                code: m.code.clone(),
                label: m.label.clone(),
                fields: Vec::new(),
            })
            .collect()
    }

    pub fn models(&self) -> &[ModelDef] {
        &self.models
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{resolve, ModelsConfig};
    use crate::error::AppError;
    use serde_json::json;

    fn config() -> ModelsConfig {
        serde_json::from_value(json!({"models": [
            {"name": "BlogPost", "verbose_name_plural": "Blog posts", "fields": [{"name": "id", "type": "int", "generated": true}]},
            {"name": "AuditLog", "fields": [{"name": "id", "type": "int", "generated": true}]}
        ]}))
        .unwrap()
    }

    #[test]
    fn resolves_kebab_code() {
        let registry = resolve(&config(), &[]).unwrap();
        assert_eq!(registry.resolve("blog-post").unwrap().name, "BlogPost");
        assert!(matches!(registry.resolve("blog-posts"), Err(AppError::NotFound(_))));
        assert!(matches!(registry.resolve("BlogPost"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn excluded_model_is_not_found() {
        let registry = resolve(&config(), &["AuditLog".to_string()]).unwrap();
        assert!(matches!(registry.resolve("audit-log"), Err(AppError::NotFound(_))));
        assert!(registry.get("AuditLog").is_some());
        let menu = registry.menu();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].code, "blog-post");
        assert_eq!(menu[0].label, "Blog posts");
        assert!(menu[0].fields.is_empty());
    }
}
