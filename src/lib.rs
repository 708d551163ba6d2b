//! An in-process plugin system.
//!
//! A host declares hooks through specifications, plugins register
//! implementations of them, and each hook call runs every implementation
//! in a defined order, collecting their results.
//!
//! ```
//! use std::sync::Arc;
//!
//! use hookline::prelude::*;
//! use serde_json::json;
//!
//! let mut pm = PluginManager::new("shop");
//! pm.add_hookspecs(
//!     &SpecNamespace::new("ShopSpecs")
//!         .hook("price", ArgNames::new(["item"]), HookspecOpts::new().firstresult())
//!         .hook("startup", ArgNames::new(["config"]), HookspecOpts::new().historic()),
//! )?;
//!
//! let catalog = FnPlugin::named("catalog").hook("price", ArgNames::new(["item"]), |args| {
//!     let item: String = args.get_as("item")?;
//!     Ok((item == "tea").then(|| json!(3)))
//! });
//! let sale = FnPlugin::named("sale").hook_with(
//!     "price",
//!     ArgNames::new(["item"]),
//!     HookimplOpts::new().tryfirst(),
//!     |_| Ok(None),
//! );
//! pm.register(Arc::new(catalog), None)?;
//! pm.register(Arc::new(sale), None)?;
//!
//! let price = pm.hook("price").expect("declared").call(&HookArgs::new().with("item", "tea"))?;
//! assert_eq!(price.into_first(), Some(json!(3)));
//!
//! // Plugins registered later still see the startup call.
//! pm.hook("startup")
//!     .expect("declared")
//!     .call_historic(HookArgs::new().with("config", json!({"currency": "EUR"})), None)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use hookline_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use hookline_internal::prelude::*;
}
