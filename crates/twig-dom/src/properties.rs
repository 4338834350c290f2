//! Property reflection
//!
//! Which names are live IDL properties on which element types, and how a
//! property write lands on the element: as live state (`value`, `checked`,
//! `selected`) or reflected into a content attribute.

/// How a live property is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    /// Live string state, not reflected
    Value,
    /// Live boolean state, not reflected
    Checked,
    /// Live boolean state of `<option>`, not reflected
    Selected,
    /// String property mirrored into the named attribute
    Reflect(&'static str),
    /// Boolean property mirrored as a presence-only attribute
    ReflectBool(&'static str),
}

/// Value written through a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Str(String),
    Bool(bool),
}

impl PropValue {
    /// Boolean view of the value
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Str(s) => !s.is_empty() && s != "false",
        }
    }

    /// String view of the value
    pub fn as_string(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// Properties every element has
const GLOBAL: &[(&str, Property)] = &[
    ("id", Property::Reflect("id")),
    ("className", Property::Reflect("class")),
    ("title", Property::Reflect("title")),
    ("lang", Property::Reflect("lang")),
    ("dir", Property::Reflect("dir")),
    ("tabIndex", Property::Reflect("tabindex")),
    ("hidden", Property::ReflectBool("hidden")),
    ("draggable", Property::Reflect("draggable")),
];

/// Properties shared by form controls
const FORM_CONTROL: &[(&str, Property)] = &[
    ("disabled", Property::ReflectBool("disabled")),
    ("name", Property::Reflect("name")),
    ("autofocus", Property::ReflectBool("autofocus")),
];

const INPUT: &[(&str, Property)] = &[
    ("value", Property::Value),
    ("checked", Property::Checked),
    ("type", Property::Reflect("type")),
    ("placeholder", Property::Reflect("placeholder")),
    ("readOnly", Property::ReflectBool("readonly")),
    ("required", Property::ReflectBool("required")),
    ("multiple", Property::ReflectBool("multiple")),
    ("list", Property::Reflect("list")),
    ("min", Property::Reflect("min")),
    ("max", Property::Reflect("max")),
    ("step", Property::Reflect("step")),
    ("maxLength", Property::Reflect("maxlength")),
];

const TEXTAREA: &[(&str, Property)] = &[
    ("value", Property::Value),
    ("placeholder", Property::Reflect("placeholder")),
    ("readOnly", Property::ReflectBool("readonly")),
    ("required", Property::ReflectBool("required")),
    ("maxLength", Property::Reflect("maxlength")),
];

const SELECT: &[(&str, Property)] = &[
    ("value", Property::Value),
    ("multiple", Property::ReflectBool("multiple")),
    ("required", Property::ReflectBool("required")),
];

const OPTION: &[(&str, Property)] = &[
    ("selected", Property::Selected),
    ("value", Property::Reflect("value")),
    ("disabled", Property::ReflectBool("disabled")),
    ("label", Property::Reflect("label")),
];

const BUTTON: &[(&str, Property)] = &[
    ("type", Property::Reflect("type")),
    ("value", Property::Reflect("value")),
];

const LABEL: &[(&str, Property)] = &[("htmlFor", Property::Reflect("for"))];
const ANCHOR: &[(&str, Property)] = &[
    ("href", Property::Reflect("href")),
    ("target", Property::Reflect("target")),
];
const IMAGE: &[(&str, Property)] = &[
    ("src", Property::Reflect("src")),
    ("alt", Property::Reflect("alt")),
];
const FORM: &[(&str, Property)] = &[
    ("action", Property::Reflect("action")),
    ("method", Property::Reflect("method")),
];

/// Look up `name` as a live property of an element with `tag`
pub fn lookup(tag: &str, name: &str) -> Option<Property> {
    let tables: &[&[(&str, Property)]] = match tag {
        "input" => &[INPUT, FORM_CONTROL],
        "textarea" => &[TEXTAREA, FORM_CONTROL],
        "select" => &[SELECT, FORM_CONTROL],
        "button" => &[BUTTON, FORM_CONTROL],
        "option" => &[OPTION],
        "label" => &[LABEL],
        "a" => &[ANCHOR],
        "img" => &[IMAGE],
        "form" => &[FORM],
        _ => &[],
    };

    tables
        .iter()
        .chain(std::iter::once(&GLOBAL))
        .flat_map(|table| table.iter())
        .find(|(prop, _)| *prop == name)
        .map(|(_, kind)| *kind)
}
