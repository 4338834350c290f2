//! Headless TodoMVC
//!
//! Drives the classic TodoMVC app against an in-memory document, playing a
//! short scripted session and printing the markup after each step.
//!
//! ```text
//! RUST_LOG=debug cargo run -p twig-app --example todomvc [todos.json]
//! ```
//!
//! With a path argument the todos persist to that file between runs.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use twig_app::dom::{Document, DomEvent, HtmlSerializer, NodeId};
use twig_app::vdom::{Attrs, Event, VNode, children, h, text};
use twig_app::{
    App, AppConfig, FileStorage, HashRouter, MemoryStorage, SharedDocument, State, Storage, Store,
    create_app, load_records, save_records,
};

const STORAGE_KEY: &str = "todos-miniframework";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Todo {
    id: u64,
    title: String,
    completed: bool,
    #[serde(default)]
    editing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    All,
    Active,
    Completed,
}

impl Filter {
    fn from_route(route: &str) -> Self {
        match route {
            "#/active" => Self::Active,
            "#/completed" => Self::Completed,
            _ => Self::All,
        }
    }

    fn accepts(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }
}

fn todos(state: &State) -> Vec<Todo> {
    state
        .get("todos")
        .cloned()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

fn str_field<'a>(state: &'a State, name: &str) -> &'a str {
    state.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// Read-modify-write of the todo list
fn update_todos(store: &Store, f: impl FnOnce(&mut Vec<Todo>)) -> anyhow::Result<()> {
    let raw = store.get_state().get("todos").cloned().unwrap_or(json!([]));
    let mut list: Vec<Todo> = serde_json::from_value(raw).context("todos in state are malformed")?;
    f(&mut list);
    store.set_state(json!({ "todos": list }));
    Ok(())
}

fn add_todo(store: &Store) -> anyhow::Result<()> {
    let title = str_field(&store.get_state(), "newTodo").trim().to_string();
    if title.is_empty() {
        return Ok(());
    }
    update_todos(store, |list| {
        let id = list.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        list.push(Todo {
            id,
            title,
            completed: false,
            editing: false,
        });
    })?;
    store.set_state(json!({ "newTodo": "" }));
    Ok(())
}

fn commit_edit(store: &Store) -> anyhow::Result<()> {
    let state = store.get_state();
    let Some(id) = state.get("editingId").and_then(Value::as_u64) else {
        return Ok(());
    };
    let title = str_field(&state, "editingText").trim().to_string();
    update_todos(store, |list| {
        if title.is_empty() {
            list.retain(|t| t.id != id);
        } else if let Some(todo) = list.iter_mut().find(|t| t.id == id) {
            todo.title = title;
            todo.editing = false;
        }
    })?;
    store.set_state(json!({ "editingId": null, "editingText": "" }));
    Ok(())
}

fn cancel_edit(store: &Store) -> anyhow::Result<()> {
    update_todos(store, |list| list.iter_mut().for_each(|t| t.editing = false))?;
    store.set_state(json!({ "editingId": null, "editingText": "" }));
    Ok(())
}

fn header(store: &Store, state: &State) -> VNode {
    let draft = str_field(state, "newTodo");

    let input_store = store.clone();
    let key_store = store.clone();
    let input = h(
        "input",
        Attrs::new()
            .attr("class", "new-todo")
            .attr("placeholder", "What needs to be done?")
            .attr("value", draft)
            .flag("autofocus", true)
            .on("input", move |event| {
                input_store.set_state(json!({ "newTodo": event.target_value() }));
            })
            .on_try("keypress", move |event| {
                if event.key_is("Enter") {
                    add_todo(&key_store)?;
                }
                Ok(())
            }),
        (),
    );

    let add_button = (draft.chars().count() >= 3).then(|| {
        let store = store.clone();
        h(
            "button",
            Attrs::new()
                .attr("class", "add-todo")
                .on_try("click", move |_| add_todo(&store)),
            "Add",
        )
    });

    h(
        "header",
        Attrs::new().attr("class", "header"),
        children![h("h1", Attrs::new(), "todos"), input, add_button],
    )
}

fn todo_item(store: &Store, state: &State, todo: &Todo) -> VNode {
    let id = todo.id;
    let class = match (todo.completed, todo.editing) {
        (_, true) => "editing",
        (true, false) => "completed",
        (false, false) => "",
    };

    let toggle_store = store.clone();
    let edit_store = store.clone();
    let destroy_store = store.clone();
    let title = todo.title.clone();

    let view = h(
        "div",
        Attrs::new().attr("class", "view"),
        children![
            h(
                "input",
                Attrs::new()
                    .attr("class", "toggle")
                    .attr("type", "checkbox")
                    .attr("checked", todo.completed)
                    .on_try("change", move |event| {
                        update_todos(&toggle_store, |list| {
                            if let Some(todo) = list.iter_mut().find(|t| t.id == id) {
                                todo.completed = event.checked;
                            }
                        })
                    }),
                ()
            ),
            h(
                "label",
                Attrs::new().on_try("dblclick", move |_| {
                    update_todos(&edit_store, |list| {
                        for todo in list.iter_mut() {
                            todo.editing = todo.id == id;
                        }
                    })?;
                    edit_store.set_state(json!({ "editingId": id, "editingText": title }));
                    Ok(())
                }),
                todo.title.as_str()
            ),
            h(
                "button",
                Attrs::new().attr("class", "destroy").on_try("click", move |_| {
                    update_todos(&destroy_store, |list| list.retain(|t| t.id != id))
                }),
                ()
            ),
        ],
    );

    let editor = todo.editing.then(|| {
        let input_store = store.clone();
        let key_store = store.clone();
        let blur_store = store.clone();
        h(
            "input",
            Attrs::new()
                .attr("class", "edit")
                .attr("value", str_field(state, "editingText"))
                .on("input", move |event: &Event| {
                    input_store.set_state(json!({ "editingText": event.target_value() }));
                })
                .on_try("keydown", move |event| {
                    if event.key_is("Enter") {
                        commit_edit(&key_store)
                    } else if event.key_is("Escape") {
                        cancel_edit(&key_store)
                    } else {
                        Ok(())
                    }
                })
                .on_try("blur", move |_| commit_edit(&blur_store)),
            (),
        )
    });

    h(
        "li",
        Attrs::new().key(id).attr("class", class),
        children![view, editor],
    )
}

fn main_section(store: &Store, state: &State, list: &[Todo], filter: Filter) -> Option<VNode> {
    if list.is_empty() {
        return None;
    }

    let all_done = list.iter().all(|t| t.completed);
    let toggle_store = store.clone();
    let toggle_all = h(
        "input",
        Attrs::new()
            .attr("id", "toggle-all")
            .attr("class", "toggle-all")
            .attr("type", "checkbox")
            .attr("checked", all_done)
            .on_try("change", move |event| {
                update_todos(&toggle_store, |list| {
                    list.iter_mut().for_each(|t| t.completed = event.checked)
                })
            }),
        (),
    );

    let items: Vec<VNode> = list
        .iter()
        .filter(|t| filter.accepts(t))
        .map(|t| todo_item(store, state, t))
        .collect();

    Some(h(
        "section",
        Attrs::new().attr("class", "main"),
        children![
            toggle_all,
            h("label", Attrs::new().attr("for", "toggle-all"), "Mark all as complete"),
            h("ul", Attrs::new().attr("class", "todo-list"), items),
        ],
    ))
}

fn footer(store: &Store, list: &[Todo], filter: Filter) -> Option<VNode> {
    if list.is_empty() {
        return None;
    }

    let left = list.iter().filter(|t| !t.completed).count();
    let noun = if left == 1 { "item" } else { "items" };

    let links: Vec<VNode> = [
        ("#/", "All", Filter::All),
        ("#/active", "Active", Filter::Active),
        ("#/completed", "Completed", Filter::Completed),
    ]
    .into_iter()
    .map(|(href, label, target)| {
        let class = if target == filter { "selected" } else { "" };
        h(
            "li",
            Attrs::new(),
            h("a", Attrs::new().attr("href", href).attr("class", class), label),
        )
    })
    .collect();

    let clear = list.iter().any(|t| t.completed).then(|| {
        let store = store.clone();
        h(
            "button",
            Attrs::new()
                .attr("class", "clear-completed")
                .on_try("click", move |_| update_todos(&store, |list| list.retain(|t| !t.completed))),
            "Clear completed",
        )
    });

    Some(h(
        "footer",
        Attrs::new().attr("class", "footer"),
        children![
            h(
                "span",
                Attrs::new().attr("class", "todo-count"),
                children![h("strong", Attrs::new(), left), text(format!(" {noun} left"))]
            ),
            h("ul", Attrs::new().attr("class", "filters"), links),
            clear,
        ],
    ))
}

fn todo_app(store: &Store, state: &State) -> VNode {
    let list = todos(state);
    let filter = Filter::from_route(str_field(state, "currentFilter"));

    h(
        "section",
        Attrs::new().attr("class", "todoapp"),
        children![
            header(store, state),
            main_section(store, state, &list, filter),
            footer(store, &list, filter),
        ],
    )
}

/// Small scripted user on top of the document
struct Session {
    document: SharedDocument,
    app: App,
}

impl Session {
    fn find(&self, class: &str) -> anyhow::Result<NodeId> {
        let doc = self.document.borrow();
        doc.tree()
            .find_by_attribute(doc.body(), "class", class)
            .with_context(|| format!("no element with class '{class}'"))
    }

    fn type_into(&self, node: NodeId, value: &str) -> anyhow::Result<()> {
        {
            let mut doc = self.document.borrow_mut();
            let tree = doc.tree_mut();
            tree.focus(node)?;
            tree.input_text(node, value)?;
        }
        self.app.dispatch(&mut DomEvent::input(node));
        Ok(())
    }

    fn add(&self, title: &str) -> anyhow::Result<()> {
        let input = self.find("new-todo")?;
        self.type_into(input, title)?;
        self.app.dispatch(&mut DomEvent::keypress(input, "Enter"));
        Ok(())
    }

    fn toggle(&self, node: NodeId, checked: bool) -> anyhow::Result<()> {
        self.document.borrow_mut().tree_mut().set_checked(node, checked)?;
        self.app.dispatch(&mut DomEvent::change(node));
        Ok(())
    }

    fn print(&self, step: &str) {
        let doc = self.document.borrow();
        let markup = HtmlSerializer::pretty().serialize_inner(doc.tree(), doc.body());
        println!("== {step} ({})\n{markup}\n", doc.hash());
    }
}

fn open_storage() -> anyhow::Result<Box<dyn Storage>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let storage = FileStorage::open(&path)
                .with_context(|| format!("failed to open storage at {path}"))?;
            tracing::info!("persisting todos to {}", storage.path().display());
            Ok(Box::new(storage))
        }
        None => Ok(Box::new(MemoryStorage::new())),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let storage = Rc::new(RefCell::new(open_storage()?));
    let saved: Vec<Todo> = load_records(&**storage.borrow(), STORAGE_KEY);
    tracing::info!("loaded {} todos", saved.len());

    let document = Rc::new(RefCell::new(Document::new("http://localhost/todomvc/index.html")));
    let store = Store::default();

    let router = HashRouter::new(store.clone(), "currentFilter");
    router.start(document.borrow().hash());

    let persist = storage.clone();
    let watched = store.clone();
    store.subscribe(move || {
        let list = todos(&watched.get_state());
        if let Err(err) = save_records(&mut **persist.borrow_mut(), STORAGE_KEY, &list) {
            tracing::error!("failed to save todos: {}", err);
        }
    });

    let view_store = store.clone();
    let config = AppConfig::new(move |state| todo_app(&view_store, state))
        .store(store)
        .initial_state(json!({
            "todos": saved,
            "newTodo": "",
            "editingId": null,
            "editingText": "",
        }));
    let app = create_app(document.clone(), config)?;
    let session = Session { document, app };
    session.print("mounted");

    session.add("buy milk")?;
    session.add("walk the dog")?;
    session.add("write docs")?;
    session.print("three todos");

    let toggle = session.find("toggle")?;
    session.toggle(toggle, true)?;
    session.print("first completed");

    router.navigate(&session.document, "#/active");
    session.print("active filter");

    router.navigate(&session.document, "#/");
    let label = {
        let doc = session.document.borrow();
        let list = session.find("todo-list")?;
        let item = doc.tree().child_at(list, 1).context("second todo missing")?;
        doc.tree().elements_by_tag_name(item, "label")[0]
    };
    session.app.dispatch(&mut DomEvent::dblclick(label));
    let editor = session.find("edit")?;
    session.type_into(editor, "walk the cat")?;
    session.app.dispatch(&mut DomEvent::keydown(editor, "Enter"));
    session.print("renamed");

    let clear = session.find("clear-completed")?;
    session.app.dispatch(&mut DomEvent::click(clear));
    session.print("cleared completed");

    session.app.run_frame();
    tracing::info!("{} render passes", session.app.render_count());
    Ok(())
}
