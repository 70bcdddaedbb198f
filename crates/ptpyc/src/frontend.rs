//! The front end driver, running tokenizing, parsing and scope resolution for one module at
//! a time.

use crate::backend::Backend;
use crate::error::{PtpyCError, PtpyCErrorKind, PtpyCResult, ResolveError};
use crate::resolution::{ResolvedModule, Resolver};
use indexmap::IndexSet;
use ptpy_ast::Module;
use ptpy_tokens::keywords::Dialect;
use thiserror::Error;
use tracing::{debug, error_span, info_span};

/// Compiles ptpy source text into resolved modules.
///
/// Must be configured using a [FrontendBuilder].
///
/// # Examples
/// ```
/// # use ptpyc::frontend::Frontend;
/// # use ptpyc::resolution::NameClass;
/// let frontend = Frontend::builder().build().unwrap();
/// let resolved = frontend.compile("a = 1\ndefine f:\n    b = a\n").unwrap();
/// assert_eq!(resolved.scope_of_module().classify("a"), Some(NameClass::Cell));
/// ```
#[derive(Debug, Clone)]
pub struct Frontend {
    dialect: Dialect,
    strict_globals: bool,
    builtins: IndexSet<String>,
    source_name: String,
}

impl Frontend {
    /// Creates the default FrontendBuilder
    #[inline]
    pub fn builder() -> FrontendBuilder {
        FrontendBuilder::new()
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn strict_globals(&self) -> bool {
        self.strict_globals
    }

    pub fn builtins(&self) -> &IndexSet<String> {
        &self.builtins
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Parses source text without resolving it
    pub fn parse(&self, source: &str) -> PtpyCResult<Module> {
        let _span = info_span!("parse", source = %self.source_name).entered();
        Ok(ptpy_ast_parsing::parse(source, self.dialect)?)
    }

    /// Tokenizes, parses and resolves source text
    pub fn compile(&self, source: &str) -> PtpyCResult<ResolvedModule> {
        let _span = error_span!("compile", source = %self.source_name).entered();
        let module = self.parse(source)?;
        let resolved = Resolver::with_builtins(self.builtins.iter().cloned()).resolve(module);
        debug!("resolved {} scopes", resolved.scopes().len());
        if self.strict_globals {
            if let Some(unbound) = resolved.unbound_globals().first() {
                let scope = &resolved.scopes()[unbound.scope];
                return Err(PtpyCError::new(
                    ResolveError::UnresolvedName {
                        name: unbound.name.clone(),
                        scope: scope.name().to_string(),
                    },
                    scope.use_site(&unbound.name),
                    None,
                ));
            }
        }
        Ok(resolved)
    }

    /// Compiles source text and hands the result to a backend
    pub fn compile_with<B: Backend>(&self, mut backend: B, source: &str) -> PtpyCResult<B::Output> {
        let resolved = self.compile(source)?;
        let _span = error_span!("backend", source = %self.source_name).entered();
        backend
            .compile_unit(&resolved)
            .map_err(|e| PtpyCError::new(PtpyCErrorKind::Backend(Box::new(e)), None, None))
    }
}

/// Builder for creating a [Frontend] instance.
#[derive(Debug, Clone)]
pub struct FrontendBuilder {
    dialect: Dialect,
    strict_globals: bool,
    builtins: Vec<String>,
    source_name: String,
}

impl FrontendBuilder {
    /// Creates a FrontendBuilder with default settings
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the keyword table used by the tokenizer
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Fail on names that are neither bound in the module nor builtins instead of treating
    /// them as globals
    pub fn strict_globals(mut self, strict: bool) -> Self {
        self.strict_globals = strict;
        self
    }

    /// Registers a name provided by the runtime namespace
    pub fn builtin(mut self, name: impl Into<String>) -> Self {
        self.builtins.push(name.into());
        self
    }

    /// Registers many names provided by the runtime namespace
    pub fn builtins<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builtins.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the name of the source used in diagnostics
    pub fn source_name(mut self, name: impl AsRef<str>) -> Self {
        self.source_name = name.as_ref().to_string();
        self
    }

    /// Builds a [Frontend] instance from this builder
    pub fn build(self) -> Result<Frontend, BuildFrontendError> {
        if let Some(bad) = self
            .builtins
            .iter()
            .find(|name| name.is_empty() || name.chars().any(char::is_whitespace))
        {
            return Err(BuildFrontendError::InvalidBuiltinName(bad.clone()));
        }
        Ok(Frontend {
            dialect: self.dialect,
            strict_globals: self.strict_globals,
            builtins: self.builtins.into_iter().collect(),
            source_name: self.source_name,
        })
    }
}

impl Default for FrontendBuilder {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            strict_globals: false,
            builtins: vec![],
            source_name: "<string>".to_string(),
        }
    }
}

/// An error occurred while building a [Frontend] instance
#[derive(Debug, Error)]
pub enum BuildFrontendError {
    #[error("{0:?} is not a valid builtin name")]
    InvalidBuiltinName(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_default_builder() {
        let frontend = Frontend::builder().build().unwrap();
        assert_eq!(frontend.dialect(), Dialect::Portuguese);
        assert!(!frontend.strict_globals());
        assert!(frontend.builtins().is_empty());
        assert_eq!(frontend.source_name(), "<string>");
    }

    #[test]
    fn test_builtins_are_deduplicated() {
        let frontend = Frontend::builder()
            .builtin("len")
            .builtins(["len", "range"])
            .build()
            .unwrap();
        assert_eq!(frontend.builtins().len(), 2);
    }

    #[test]
    fn test_invalid_builtin() {
        let error = Frontend::builder().builtin("").build().unwrap_err();
        assert!(matches!(error, BuildFrontendError::InvalidBuiltinName(name) if name.is_empty()));
        let error = Frontend::builder().builtin("two words").build().unwrap_err();
        assert!(matches!(error, BuildFrontendError::InvalidBuiltinName(name) if name == "two words"));
    }

    #[test]
    fn test_parse_only() {
        let frontend = Frontend::builder().dialect(Dialect::English).build().unwrap();
        let module = frontend.parse("x = 1\n").unwrap();
        assert!(module.scope.is_none());
    }
}
