//! JSON tree navigation for `/`-separated key paths.
//!
//! The tree follows the store's data model: a node either holds a scalar or
//! children, `null` means absence, and an object with no children does not
//! exist. Writing `null` at a path is therefore a delete, and deletes prune
//! any parents they empty out.

use serde_json::{Map, Value};

/// Split a key path into its segments, ignoring empty ones so that leading
/// or doubled slashes cannot address a phantom node.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// The value at `path`, or `None` when the node does not exist.
#[must_use]
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments(path) {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

/// Assign `value` at `path`, creating intermediate objects as needed.
///
/// A scalar sitting where an intermediate object is needed gets replaced by
/// one. Assigning [`Value::Null`] removes the node instead, with the same
/// pruning as [`remove`].
pub fn set(root: &mut Value, path: &str, value: Value) {
    if value.is_null() {
        remove(root, path);
        return;
    }
    let segments: Vec<&str> = segments(path).collect();
    set_at(root, &segments, value);
}

fn set_at(node: &mut Value, segments: &[&str], value: Value) {
    match segments {
        [] => *node = value,
        [head, rest @ ..] => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            if let Value::Object(children) = node {
                let child = children.entry((*head).to_string()).or_insert(Value::Null);
                set_at(child, rest, value);
            }
        }
    }
}

/// Remove the node at `path` and prune any parents left without children.
/// Removing an absent node is a no-op.
pub fn remove(root: &mut Value, path: &str) {
    let segments: Vec<&str> = segments(path).collect();
    if segments.is_empty() {
        *root = Value::Object(Map::new());
        return;
    }
    remove_at(root, &segments);
}

/// Returns `true` when `node` ended up empty and should be pruned by its
/// parent.
fn remove_at(node: &mut Value, segments: &[&str]) -> bool {
    let Some(children) = node.as_object_mut() else {
        return false;
    };
    match segments {
        [] => false,
        [leaf] => {
            children.remove(*leaf);
            children.is_empty()
        }
        [head, rest @ ..] => {
            if let Some(child) = children.get_mut(*head)
                && remove_at(child, rest)
            {
                children.remove(*head);
            }
            children.is_empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn empty() -> Value {
        json!({})
    }

    #[test]
    fn should_set_and_get_nested_values() {
        let mut root = empty();
        set(&mut root, "home_automation/devices/pico_w_001/online", json!(true));
        set(
            &mut root,
            "home_automation/devices/pico_w_001/relays/relay_1/status",
            json!(false),
        );
        assert_eq!(
            root,
            json!({
                "home_automation": {
                    "devices": {
                        "pico_w_001": {
                            "online": true,
                            "relays": { "relay_1": { "status": false } },
                        }
                    }
                }
            })
        );
        assert_eq!(
            get(&root, "home_automation/devices/pico_w_001/online"),
            Some(&json!(true))
        );
        assert_eq!(get(&root, "home_automation/devices/missing"), None);
    }

    #[test]
    fn should_replace_scalar_with_object_on_deeper_write() {
        let mut root = json!({"a": 1});
        set(&mut root, "a/b", json!(2));
        assert_eq!(root, json!({"a": {"b": 2}}));
    }

    #[test]
    fn should_treat_null_assignment_as_delete() {
        let mut root = json!({"schedules": {"s1": {"enabled": true}, "s2": {"enabled": false}}});
        set(&mut root, "schedules/s1", Value::Null);
        assert_eq!(root, json!({"schedules": {"s2": {"enabled": false}}}));
    }

    #[test]
    fn should_prune_parents_emptied_by_remove() {
        let mut root = json!({"schedules": {"s1": {"enabled": true}}, "other": 1});
        remove(&mut root, "schedules/s1");
        assert_eq!(root, json!({"other": 1}));
        assert_eq!(get(&root, "schedules"), None);
    }

    #[test]
    fn should_ignore_removal_of_absent_node() {
        let mut root = json!({"a": {"b": 1}});
        remove(&mut root, "a/c/d");
        remove(&mut root, "x");
        assert_eq!(root, json!({"a": {"b": 1}}));
    }

    #[test]
    fn should_ignore_empty_path_segments() {
        let mut root = empty();
        set(&mut root, "/a//b/", json!(1));
        assert_eq!(get(&root, "a/b"), Some(&json!(1)));
        assert_eq!(get(&root, "//a/b//"), Some(&json!(1)));
    }
}
