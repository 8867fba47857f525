/// Asset catalog: literal image names and the category pools used to satisfy
/// placeholders that don't name a specific image
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque handle to a display asset (an asset path relative to the asset root)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceHandle(Arc<str>);

impl ResourceHandle {
    pub fn new(path: impl AsRef<str>) -> Self {
        ResourceHandle(Arc::from(path.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two category pools a non-literal placeholder can draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sad,
    Fun,
}

impl Category {
    /// `sad` (any case) selects the sad pool, every other name the fun pool
    pub fn for_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("sad") {
            Category::Sad
        } else {
            Category::Fun
        }
    }
}

/// How a placeholder name is satisfied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Literal(ResourceHandle),
    Category(Category),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    EmptyPool(Category),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::EmptyPool(category) => {
                write!(f, "The {:?} image pool must not be empty", category)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Literal name table plus the sad and fun pools.
///
/// Pools are checked for emptiness at construction so picking never fails.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    literals: HashMap<String, ResourceHandle>,
    sad: Vec<ResourceHandle>,
    fun: Vec<ResourceHandle>,
}

impl AssetCatalog {
    /// Create a catalog with the given category pools and no literal names
    pub fn new(
        sad: Vec<ResourceHandle>,
        fun: Vec<ResourceHandle>,
    ) -> Result<Self, CatalogError> {
        if sad.is_empty() {
            return Err(CatalogError::EmptyPool(Category::Sad));
        }
        if fun.is_empty() {
            return Err(CatalogError::EmptyPool(Category::Fun));
        }
        Ok(AssetCatalog {
            literals: HashMap::new(),
            sad,
            fun,
        })
    }

    /// Register a literal name. Names are matched case-insensitively.
    pub fn with_literal(mut self, name: &str, resource: ResourceHandle) -> Self {
        self.literals.insert(name.to_lowercase(), resource);
        self
    }

    /// The catalog shipped with the builtin script
    pub fn builtin() -> Self {
        let h = ResourceHandle::new;
        let catalog = AssetCatalog {
            literals: HashMap::new(),
            sad: vec![
                h("sad/crying.jfif"),
                h("sad/crying ass.jfif"),
                h("sad/crying river.jfif"),
                h("sad/sad-1.jfif"),
            ],
            fun: vec![
                h("fun/dumb.jfif"),
                h("fun/loading.jfif"),
                h("fun/thinking.jfif"),
            ],
        };
        catalog
            .with_literal("heart", h("heart/heart.jfif"))
            .with_literal("flower awkard", h("flower/flower arkward.jfif"))
            .with_literal("flower awkward", h("flower/flower arkward.jfif"))
            .with_literal("flower", h("flower/flower.jfif"))
            .with_literal("be my valentine!", h("heart/be my valentine!.jfif"))
            .with_literal("dumb", h("fun/dumb.jfif"))
            .with_literal("loading", h("fun/loading.jfif"))
            .with_literal("thinking", h("fun/thinking.jfif"))
            .with_literal("yipeeee", h("happy/yipeeee.jfif"))
            .with_literal("nice", h("happy/nice.jfif"))
            .with_literal("heartie", h("heart/heartie.jfif"))
            .with_literal("valentine", h("heart/valentine.jfif"))
            .with_literal("love", h("heart/be my valentine!.jfif"))
    }

    /// Decide how `name` is satisfied: literal table first, then category
    pub fn lookup(&self, name: &str) -> Resolution {
        match self.literals.get(&name.to_lowercase()) {
            Some(resource) => Resolution::Literal(resource.clone()),
            None => Resolution::Category(Category::for_name(name)),
        }
    }

    /// Whether `name` is a literal key or an explicit category token
    pub fn is_known_name(&self, name: &str) -> bool {
        self.literals.contains_key(&name.to_lowercase())
            || name.eq_ignore_ascii_case("sad")
            || name.eq_ignore_ascii_case("fun")
    }

    pub fn pool(&self, category: Category) -> &[ResourceHandle] {
        match category {
            Category::Sad => &self.sad,
            Category::Fun => &self.fun,
        }
    }

    /// Resolve `name` to a resource, drawing uniformly from a pool when needed
    pub fn pick<R: Rng>(&self, name: &str, rng: &mut R) -> ResourceHandle {
        match self.lookup(name) {
            Resolution::Literal(resource) => resource,
            Resolution::Category(category) => {
                let pool = self.pool(category);
                pool[rng.gen_range(0..pool.len())].clone()
            }
        }
    }
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_handles_serialize_as_paths() {
        fn assert_serde<T: Serialize + for<'de> Deserialize<'de>>() {}
        assert_serde::<ResourceHandle>();
        assert_serde::<Category>();
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let result = AssetCatalog::new(vec![], vec![ResourceHandle::new("a")]);
        assert_eq!(result.unwrap_err(), CatalogError::EmptyPool(Category::Sad));

        let result = AssetCatalog::new(vec![ResourceHandle::new("a")], vec![]);
        assert_eq!(result.unwrap_err(), CatalogError::EmptyPool(Category::Fun));
    }

    #[test]
    fn test_literal_lookup_is_case_insensitive() {
        let catalog = AssetCatalog::builtin();
        assert_eq!(
            catalog.lookup("HeArT"),
            Resolution::Literal(ResourceHandle::new("heart/heart.jfif"))
        );
    }

    #[test]
    fn test_unknown_names_use_fun_pool() {
        let catalog = AssetCatalog::builtin();
        assert_eq!(catalog.lookup("SAD"), Resolution::Category(Category::Sad));
        assert_eq!(catalog.lookup("fun"), Resolution::Category(Category::Fun));
        assert_eq!(
            catalog.lookup("no such thing"),
            Resolution::Category(Category::Fun)
        );
        assert!(!catalog.is_known_name("no such thing"));
        assert!(catalog.is_known_name("Sad"));
    }

    #[test]
    fn test_pick_from_pool_is_member() {
        let catalog = AssetCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let picked = catalog.pick("sad", &mut rng);
            assert!(catalog.pool(Category::Sad).contains(&picked));
        }
    }
}
