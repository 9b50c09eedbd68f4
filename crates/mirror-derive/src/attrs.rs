// #[reflect(...)] attribute parsing shared by both macros

use syn::{Attribute, LitStr, Result};

/// Options collected from `#[reflect(...)]` attributes on one item
#[derive(Default)]
pub struct ReflectAttrs {
    pub name: Option<LitStr>,
    pub tag: Option<LitStr>,
    pub skip: bool,
    pub methods: bool,
}

/// Which keys an item position accepts
#[derive(Clone, Copy)]
pub enum Position {
    Struct,
    Field,
    Method,
}

impl Position {
    fn allows(self, key: &str) -> bool {
        matches!(
            (self, key),
            (Position::Struct, "name" | "methods")
                | (Position::Field, "name" | "tag" | "skip")
                | (Position::Method, "name" | "skip")
        )
    }

    fn describe(self) -> &'static str {
        match self {
            Position::Struct => "struct",
            Position::Field => "field",
            Position::Method => "method",
        }
    }
}

/// Parse every `#[reflect(...)]` attribute in `attrs`
pub fn parse(attrs: &[Attribute], position: Position) -> Result<ReflectAttrs> {
    let mut parsed = ReflectAttrs::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            let key = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();
            if !position.allows(&key) {
                return Err(meta.error(format!(
                    "unsupported reflect attribute on a {}",
                    position.describe()
                )));
            }
            match key.as_str() {
                "name" => parsed.name = Some(meta.value()?.parse()?),
                "tag" => parsed.tag = Some(meta.value()?.parse()?),
                "skip" => parsed.skip = true,
                "methods" => parsed.methods = true,
                _ => return Err(meta.error("unsupported reflect attribute")),
            }
            Ok(())
        })?;
    }
    Ok(parsed)
}

/// Drop `#[reflect(...)]` attributes, which only the macros understand
pub fn strip(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !attr.path().is_ident("reflect"));
}
