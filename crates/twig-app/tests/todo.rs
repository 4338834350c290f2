//! Adding a todo through the keyboard

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use twig_app::dom::{Document, DomEvent, MutationRecord, NodeId};
use twig_app::vdom::{Attrs, VNode, children, h};
use twig_app::{App, AppConfig, SharedDocument, State, Store, create_app};

fn todo_view(store: &Store, state: &State) -> VNode {
    let draft = state.get("newTodo").and_then(Value::as_str).unwrap_or_default();
    let todos = state.get("todos").and_then(Value::as_array).cloned().unwrap_or_default();

    let on_input = {
        let store = store.clone();
        move |event: &twig_app::vdom::Event| {
            store.set_state(json!({ "newTodo": event.target_value() }));
        }
    };
    let on_keypress = {
        let store = store.clone();
        move |event: &twig_app::vdom::Event| {
            if !event.key_is("Enter") {
                return;
            }
            let title = event.target_value().trim().to_string();
            if title.is_empty() {
                return;
            }
            let state = store.get_state();
            let mut todos = state.get("todos").and_then(Value::as_array).cloned().unwrap_or_default();
            let id = state.get("nextId").and_then(Value::as_u64).unwrap_or(1);
            todos.push(json!({ "id": id, "title": title, "completed": false }));
            store.set_state(json!({ "todos": todos, "newTodo": "", "nextId": id + 1 }));
        }
    };

    let items: Vec<VNode> = todos
        .iter()
        .map(|todo| {
            let id = todo["id"].as_u64().unwrap_or_default();
            let title = todo["title"].as_str().unwrap_or_default().to_string();
            h("li", Attrs::new().key(id), h("label", Attrs::new(), title))
        })
        .collect();

    h(
        "section",
        Attrs::new().attr("class", "todoapp"),
        children![
            h(
                "input",
                Attrs::new()
                    .attr("class", "new-todo")
                    .attr("value", draft)
                    .on("input", on_input)
                    .on("keypress", on_keypress),
                ()
            ),
            h("ul", Attrs::new().attr("class", "todo-list"), items),
        ],
    )
}

fn mount() -> (SharedDocument, App) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let document = Rc::new(RefCell::new(Document::new("http://localhost/#/")));
    let store = Store::default();
    let inner = store.clone();
    let config = AppConfig::new(move |state| todo_view(&inner, state))
        .store(store)
        .initial_state(json!({ "todos": [], "newTodo": "" }));
    let app = create_app(document.clone(), config).unwrap();
    (document, app)
}

fn new_todo_input(document: &SharedDocument) -> NodeId {
    let doc = document.borrow();
    doc.tree().find_by_attribute(doc.body(), "class", "new-todo").unwrap()
}

fn type_text(document: &SharedDocument, app: &App, input: NodeId, text: &str) {
    {
        let mut doc = document.borrow_mut();
        let tree = doc.tree_mut();
        tree.focus(input).unwrap();
        tree.input_text(input, text).unwrap();
    }
    assert!(app.dispatch(&mut DomEvent::input(input)));
}

#[test]
fn test_enter_adds_one_item() {
    let (document, app) = mount();
    let input = new_todo_input(&document);
    type_text(&document, &app, input, "buy milk");
    assert_eq!(app.get_state().get("newTodo"), Some(&json!("buy milk")));

    document.borrow_mut().tree_mut().record_mutations(true);
    assert!(app.dispatch(&mut DomEvent::keypress(input, "Enter")));
    let mutations = document.borrow_mut().tree_mut().take_mutations();

    let doc = document.borrow();
    let tree = doc.tree();
    let created_items = mutations
        .iter()
        .filter(|m| matches!(m, MutationRecord::Created { node } if tree.tag_name(*node) == Some("li")))
        .count();
    let removed = mutations
        .iter()
        .filter(|m| matches!(m, MutationRecord::Removed { .. }))
        .count();
    assert_eq!(created_items, 1);
    assert_eq!(removed, 0);

    let state = app.get_state();
    assert_eq!(state["todos"][0]["title"], json!("buy milk"));
    assert_eq!(state["todos"][0]["completed"], json!(false));

    // The field is cleared and keeps focus
    assert_eq!(tree.value(input), Some(""));
    assert_eq!(tree.active_element(), Some(input));

    let list = tree.find_by_attribute(doc.body(), "class", "todo-list").unwrap();
    assert_eq!(tree.child_count(list), 1);
    assert_eq!(tree.text_content(list), "buy milk");
}

#[test]
fn test_blank_entry_is_ignored() {
    let (document, app) = mount();
    let input = new_todo_input(&document);
    type_text(&document, &app, input, "   ");

    let renders = app.render_count();
    assert!(app.dispatch(&mut DomEvent::keypress(input, "Enter")));
    assert_eq!(app.render_count(), renders);
    assert_eq!(app.get_state()["todos"], json!([]));
}

#[test]
fn test_second_item_keeps_first_node() {
    let (document, app) = mount();
    let input = new_todo_input(&document);

    type_text(&document, &app, input, "buy milk");
    app.dispatch(&mut DomEvent::keypress(input, "Enter"));
    let list = {
        let doc = document.borrow();
        doc.tree().find_by_attribute(doc.body(), "class", "todo-list").unwrap()
    };
    let milk = document.borrow().tree().child_at(list, 0).unwrap();

    type_text(&document, &app, input, "walk the dog");
    app.dispatch(&mut DomEvent::keypress(input, "Enter"));

    let doc = document.borrow();
    let tree = doc.tree();
    assert_eq!(tree.child_count(list), 2);
    assert_eq!(tree.child_at(list, 0), Some(milk));
    assert_eq!(tree.text_content(tree.child_at(list, 1).unwrap()), "walk the dog");
}
