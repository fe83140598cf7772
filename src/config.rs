//! Recognized configuration options.
//!
//! Two keys only: which package is the analysis entry point, and the fully
//! qualified names of the framework's `Engine`/`RouterGroup`/context types.
//! There is no file-based configuration layer; callers build this struct
//! programmatically.

/// Fully qualified names of the framework types the classifier looks for.
///
/// Defaults to the well-known Gin names, matching
/// `examples/original_source/reveal/endpoints.go`'s `resolveGinKind`/`isGinContext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkTypeNames {
    /// Canonical name of the root router type (e.g. `github.com/gin-gonic/gin.Engine`).
    pub engine: String,
    /// Canonical name of the group/prefix router type.
    pub router_group: String,
    /// Canonical name of the per-request handler context type, as seen on a
    /// pointer receiver (e.g. `*github.com/gin-gonic/gin.Context`).
    pub context: String,
}

impl Default for FrameworkTypeNames {
    fn default() -> Self {
        Self {
            engine: "github.com/gin-gonic/gin.Engine".to_string(),
            router_group: "github.com/gin-gonic/gin.RouterGroup".to_string(),
            context: "*github.com/gin-gonic/gin.Context".to_string(),
        }
    }
}

/// Engine-wide configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Import path of the package to start traversal from.
    ///
    /// `None` means the last package in the loader's output is used as the
    /// entry point.
    pub entry_package: Option<String>,
    /// Names of the framework's router and context types.
    pub framework_type_names: FrameworkTypeNames,
}
