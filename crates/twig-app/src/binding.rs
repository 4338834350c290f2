//! Two-way binding of form inputs to dotted state paths

use serde_json::{Map, Value};
use twig_vdom::Attrs;

use crate::store::{State, Store};

/// Resolve `a.b.c` in `state`. Numeric segments index arrays.
pub fn get_path<'a>(state: &'a State, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = state.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at `path`, rebuilding only the objects along the path
///
/// Intermediates that are missing or not objects become objects.
pub fn set_path(store: &Store, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((first, rest)) = segments.split_first().filter(|(first, _)| !first.is_empty()) else {
        tracing::warn!("set_path ignored: empty path");
        return;
    };

    let current = store.get_state().get(*first).cloned().unwrap_or(Value::Null);
    let mut partial = Map::new();
    partial.insert(first.to_string(), set_in(current, rest, value));
    store.set_state(partial);
}

fn set_in(current: Value, path: &[&str], value: Value) -> Value {
    let Some((head, rest)) = path.split_first() else {
        return value;
    };
    let mut map = match current {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let child = map.remove(*head).unwrap_or(Value::Null);
    map.insert(head.to_string(), set_in(child, rest, value));
    Value::Object(map)
}

/// `value` + `oninput` attributes binding a text input to `path`
pub fn bind_input(store: &Store, path: &str) -> Attrs {
    let value = match get_path(&store.get_state(), path) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let store = store.clone();
    let path = path.to_string();
    Attrs::new()
        .attr("value", value)
        .on("input", move |event| {
            set_path(&store, &path, Value::String(event.target_value().to_string()));
        })
}
