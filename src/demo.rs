// Demo mode - scripted generation for showcasing the TUI
//
// Streams a React todo-list component the way a real service would: the
// language arrives first, then the code grows a few lines per increment with
// short pauses in between. Every increment is a full snapshot of the object
// so far.

use crate::service::{ScriptStep, ScriptedService};
use serde_json::json;
use std::time::Duration;

/// The prompt the demo answers
pub const DEMO_PROMPT: &str = "Generate a React todolist component";

/// Language reported by the demo
pub const DEMO_LANGUAGE: &str = "tsx";

/// The full component the demo streams
pub const TODO_LIST_TSX: &str = r#"import { useState } from "react";

type Todo = {
  id: number;
  text: string;
  done: boolean;
};

export default function TodoList() {
  const [todos, setTodos] = useState<Todo[]>([]);
  const [draft, setDraft] = useState("");

  const addTodo = () => {
    const text = draft.trim();
    if (!text) return;
    setTodos((prev) => [...prev, { id: Date.now(), text, done: false }]);
    setDraft("");
  };

  const toggleTodo = (id: number) => {
    setTodos((prev) =>
      prev.map((todo) => (todo.id === id ? { ...todo, done: !todo.done } : todo))
    );
  };

  const removeTodo = (id: number) => {
    setTodos((prev) => prev.filter((todo) => todo.id !== id));
  };

  return (
    <div className="todo-list">
      <h1>Todo List</h1>
      <form
        onSubmit={(e) => {
          e.preventDefault();
          addTodo();
        }}
      >
        <input
          value={draft}
          onChange={(e) => setDraft(e.target.value)}
          placeholder="What needs doing?"
        />
        <button type="submit">Add</button>
      </form>
      <ul>
        {todos.map((todo) => (
          <li key={todo.id}>
            <label>
              <input
                type="checkbox"
                checked={todo.done}
                onChange={() => toggleTodo(todo.id)}
              />
              <span style={{ textDecoration: todo.done ? "line-through" : "none" }}>
                {todo.text}
              </span>
            </label>
            <button onClick={() => removeTodo(todo.id)}>Delete</button>
          </li>
        ))}
      </ul>
    </div>
  );
}
"#;

/// Lines added per increment
const LINES_PER_STEP: usize = 3;

/// Steps for the todo-list generation, `pause` between increments
pub fn todo_list_steps(pause: Duration) -> Vec<ScriptStep> {
    let mut steps = vec![
        ScriptStep::Delay(pause),
        ScriptStep::Emit(json!({ "language": DEMO_LANGUAGE })),
    ];

    let lines: Vec<&str> = TODO_LIST_TSX.split_inclusive('\n').collect();
    let mut end = 0;
    while end < lines.len() {
        end = (end + LINES_PER_STEP).min(lines.len());
        let code: String = lines[..end].concat();
        steps.push(ScriptStep::Delay(pause));
        steps.push(ScriptStep::Emit(json!({
            "language": DEMO_LANGUAGE,
            "code": code,
        })));
    }

    steps
}

/// Scripted service used by `--demo`
pub fn service() -> ScriptedService {
    ScriptedService::new(todo_list_steps(Duration::from_millis(120))).with_label("demo")
}
