//! Mirror ORM - tag-driven query compilation
//!
//! A minimal mapping layer over `mirror-reflect`: field tags name the
//! columns, the type name names the table.
//!
//! # Example
//!
//! ```ignore
//! use mirror_orm::compile;
//! use mirror_reflect::{describe, Reflect, Value};
//!
//! #[derive(Reflect)]
//! struct ClassModel {
//!     #[reflect(tag = r#"orm:"name""#)]
//!     name: String,
//!     #[reflect(tag = r#"orm:"id""#)]
//!     id: i64,
//! }
//!
//! let model = ClassModel { name: String::new(), id: 0 };
//! let descriptor = describe(&Value::of(&model))?;
//! let class = String::from("三年一班");
//! let query = compile(&descriptor, "orm", Some("name = ?"), &[&class])?;
//! assert_eq!(query, "SELECT name,id FROM classmodels WHERE name = '三年一班';");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod mapper;
pub mod query;

pub use config::QueryConfig;
pub use error::{OrmError, OrmResult};
pub use mapper::{compile_insert, populate};
pub use query::{compile, literal, Compiler};
