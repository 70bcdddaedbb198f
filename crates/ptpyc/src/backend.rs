//! The seam between the front end and whatever turns a resolved module into something
//! runnable.

use crate::resolution::ResolvedModule;

/// Consumes resolved modules.
///
/// A backend receives the syntax tree with every module and closure block annotated with
/// its scope, and the scope table holding each scope's locals and name classifications.
pub trait Backend {
    /// What compiling a single unit produces
    type Output;
    /// The error a backend can fail with
    type Error: std::error::Error + Send + Sync + 'static;

    /// Compiles a single resolved module
    fn compile_unit(&mut self, unit: &ResolvedModule) -> Result<Self::Output, Self::Error>;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    type Output = B::Output;
    type Error = B::Error;

    fn compile_unit(&mut self, unit: &ResolvedModule) -> Result<Self::Output, Self::Error> {
        (**self).compile_unit(unit)
    }
}
