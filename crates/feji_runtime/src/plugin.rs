//! The plugin seam.

use feji_foundation::Result;

use crate::runtime::Runtime;

/// A unit of game logic loaded into a [`Runtime`].
///
/// `load` runs once. It registers the plugin's components and event
/// handlers; bindings are usually set up later, per entity, by the
/// constructors the plugin exposes.
pub trait Plugin {
    /// Name used in logs, error frames and the config's plugin list.
    fn name(&self) -> &str;

    /// Registers components and handlers.
    ///
    /// # Errors
    ///
    /// Any registration failure; the runtime reports it with the plugin's
    /// name attached.
    fn load(&self, runtime: &mut Runtime) -> Result<()>;
}
