// Registration system for extension modules.
// Extension modules are plain data bound into the root namespace: a table
// of host callables per module, or direct globals for the basic module.

use std::rc::Rc;

use crate::esl_value::{EslTable, EslValue};
use crate::extensions;
use crate::host::HostFunction;
use crate::namespace::Namespace;

/// Marker name for entries registered directly into the root namespace
/// instead of under a module table.
pub const GLOBAL_MODULE: &str = "_G";

/// Type for value initializers - functions that create values when the
/// module loads.
pub type ValueInitializer = fn() -> EslValue;

/// Entry in an extension module - a callable or a value.
pub enum ExtensionEntry {
    Function(HostFunction),
    Value(ValueInitializer),
}

/// An extension module containing multiple functions and values.
pub struct ExtensionModule {
    pub name: &'static str,
    pub entries: Vec<(&'static str, ExtensionEntry)>,
}

impl ExtensionModule {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    pub fn with_function(mut self, name: &'static str, func: HostFunction) -> Self {
        self.entries.push((name, ExtensionEntry::Function(func)));
        self
    }

    pub fn with_value(mut self, name: &'static str, value_init: ValueInitializer) -> Self {
        self.entries.push((name, ExtensionEntry::Value(value_init)));
        self
    }
}

/// Builder for extension modules of synchronous host functions.
#[macro_export]
macro_rules! ext_module {
    ($name:expr, {
        $($item_name:expr => $item:expr),* $(,)?
    }) => {{
        let mut module = $crate::lib_registry::ExtensionModule::new($name);
        $(
            module.entries.push((
                $item_name,
                $crate::lib_registry::ExtensionEntry::Function(
                    $crate::host::HostFunction::sync($item_name, $item),
                ),
            ));
        )*
        module
    }};
}

/// Registry for extension modules, loaded per interpreter instance.
pub struct ExtensionRegistry {
    modules: Vec<ExtensionModule>, // Vec preserves registration order
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    pub fn register(&mut self, module: ExtensionModule) {
        self.modules.push(module);
    }

    /// Bind all registered modules into a root namespace.
    pub fn load_all(&self, namespace: &Rc<Namespace>) {
        for module in &self.modules {
            self.load_module(namespace, module);
        }
    }

    fn load_module(&self, namespace: &Rc<Namespace>, module: &ExtensionModule) {
        if module.name == GLOBAL_MODULE {
            // Global functions are registered directly.
            for (name, entry) in &module.entries {
                namespace.set_var(name, entry_value(entry), false);
            }
        } else {
            let mut table = EslTable::new();
            for (name, entry) in &module.entries {
                table.set_str(name, entry_value(entry));
            }
            namespace.set_var(module.name, EslValue::table(table), false);
        }

        log::debug!("loaded extension module `{}'", module.name);
    }

    pub fn get_module(&self, name: &str) -> Option<&ExtensionModule> {
        self.modules.iter().find(|m| m.name == name)
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn entry_value(entry: &ExtensionEntry) -> EslValue {
    match entry {
        ExtensionEntry::Function(func) => EslValue::Callable(func.clone()),
        ExtensionEntry::Value(value_init) => value_init(),
    }
}

/// Create the standard registry with all bundled extension modules.
pub fn create_standard_registry() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();

    registry.register(extensions::basic::create_basic_module());
    registry.register(extensions::math::create_math_module());
    registry.register(extensions::table::create_table_module());
    registry.register(extensions::datetime::create_datetime_module());
    registry.register(extensions::list::create_list_module());

    registry
}
