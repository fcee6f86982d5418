//! Dialogue definition: named actions parsed once from the JSON document into a sum type.
//!
//! Document shape: a JSON object keyed by action name. An action with `mensagens` is a script of
//! steps (`tipo` = `texto` | `menu`, `conteudo`, optional `delay` in ms); any other action must carry
//! `menu` (option key → `{texto, acao}`) and optionally `titulo`.

use menubot_core::DefinitionError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Action every new conversation starts at, and where terminal scripts return to.
pub const DEFAULT_WELCOME_ACTION: &str = "boasVindas";

/// One selectable entry of a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub key: String,
    pub text: String,
    pub target: String,
}

/// Title plus options in declared document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub title: Option<String>,
    pub options: Vec<MenuOption>,
}

impl Menu {
    /// Target action of the option whose key equals `key` exactly.
    pub fn target_for(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.target.as_str())
    }

    /// Renders `title\n\nkey - text\n...`, trimmed. No title renders only the option lines.
    pub fn render(&self) -> String {
        let mut out = match &self.title {
            Some(title) => format!("{}\n\n", title),
            None => String::new(),
        };
        for option in &self.options {
            out.push_str(&format!("{} - {}\n", option.key, option.text));
        }
        out.trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepContent {
    Text(String),
    Menu(Menu),
}

/// One outgoing message, optionally delayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub delay: Option<Duration>,
    pub content: StepContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Script(Vec<Step>),
    Menu(Menu),
}

impl Action {
    /// The menu a conversation waits at after this action: the menu itself, or a script's last step
    /// when that step is a menu.
    pub fn trailing_menu(&self) -> Option<&Menu> {
        match self {
            Action::Menu(menu) => Some(menu),
            Action::Script(steps) => match steps.last() {
                Some(Step {
                    content: StepContent::Menu(menu),
                    ..
                }) => Some(menu),
                _ => None,
            },
        }
    }

    /// All menus reachable from this action (for reference checks).
    fn menus(&self) -> Vec<&Menu> {
        match self {
            Action::Menu(menu) => vec![menu],
            Action::Script(steps) => steps
                .iter()
                .filter_map(|s| match &s.content {
                    StepContent::Menu(menu) => Some(menu),
                    StepContent::Text(_) => None,
                })
                .collect(),
        }
    }
}

/// Immutable, fully parsed set of actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueDefinition {
    welcome: String,
    order: Vec<String>,
    actions: HashMap<String, Action>,
}

impl DialogueDefinition {
    /// Parses the document. Dangling menu targets are allowed; see [`Self::dangling_targets`].
    pub fn parse(text: &str, welcome: &str) -> Result<Self, DefinitionError> {
        let root: Value =
            serde_json::from_str(text).map_err(|e| DefinitionError::Syntax(e.to_string()))?;
        let Value::Object(entries) = root else {
            return Err(DefinitionError::NotAnObject);
        };

        let mut order = Vec::with_capacity(entries.len());
        let mut actions = HashMap::with_capacity(entries.len());
        for (name, value) in entries {
            let raw: RawAction = serde_json::from_value(value)
                .map_err(|e| DefinitionError::shape(&name, e.to_string()))?;
            let action = raw.into_action(&name)?;
            order.push(name.clone());
            actions.insert(name, action);
        }

        Ok(Self {
            welcome: welcome.to_string(),
            order,
            actions,
        })
    }

    pub fn welcome(&self) -> &str {
        &self.welcome
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Action names in document order.
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(action, option key, missing target)` for every menu option pointing at an absent action.
    pub fn dangling_targets(&self) -> Vec<(String, String, String)> {
        let mut dangling = Vec::new();
        for name in &self.order {
            let Some(action) = self.actions.get(name) else {
                continue;
            };
            for menu in action.menus() {
                for option in &menu.options {
                    if !self.actions.contains_key(&option.target) {
                        dangling.push((name.clone(), option.key.clone(), option.target.clone()));
                    }
                }
            }
        }
        dangling
    }
}

// ---------- Document shape ----------

#[derive(Deserialize)]
struct RawAction {
    titulo: Option<String>,
    menu: Option<Map<String, Value>>,
    mensagens: Option<Vec<RawStep>>,
}

#[derive(Deserialize)]
struct RawStep {
    tipo: String,
    conteudo: Value,
    /// Milliseconds; any non-negative JSON number.
    delay: Option<f64>,
}

#[derive(Deserialize)]
struct RawMenuBody {
    titulo: Option<String>,
    menu: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawOption {
    texto: String,
    acao: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    One(String),
    Lines(Vec<String>),
}

impl RawAction {
    fn into_action(self, name: &str) -> Result<Action, DefinitionError> {
        if let Some(steps) = self.mensagens {
            let steps = steps
                .into_iter()
                .enumerate()
                .map(|(i, step)| step.into_step(name, i))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Action::Script(steps));
        }
        match self.menu {
            Some(options) => Ok(Action::Menu(build_menu(name, self.titulo, options)?)),
            None => Err(DefinitionError::shape(
                name,
                "expected either 'mensagens' or 'menu'",
            )),
        }
    }
}

impl RawStep {
    fn into_step(self, action: &str, index: usize) -> Result<Step, DefinitionError> {
        let content = match self.tipo.as_str() {
            "texto" => {
                let text: RawText = serde_json::from_value(self.conteudo).map_err(|_| {
                    DefinitionError::shape(
                        action,
                        format!("step {}: 'conteudo' must be a string or a list of strings", index),
                    )
                })?;
                StepContent::Text(match text {
                    RawText::One(s) => s,
                    RawText::Lines(lines) => lines.join("\n"),
                })
            }
            "menu" => {
                let body: RawMenuBody = serde_json::from_value(self.conteudo).map_err(|e| {
                    DefinitionError::shape(action, format!("step {}: {}", index, e))
                })?;
                StepContent::Menu(build_menu(action, body.titulo, body.menu)?)
            }
            other => {
                return Err(DefinitionError::shape(
                    action,
                    format!("step {}: unknown tipo '{}'", index, other),
                ))
            }
        };
        let delay = match self.delay {
            None => None,
            Some(ms) if ms.is_finite() && ms >= 0.0 => Some(Duration::from_millis(ms.round() as u64)),
            Some(ms) => {
                return Err(DefinitionError::shape(
                    action,
                    format!("step {}: 'delay' must be a non-negative number of milliseconds, got {}", index, ms),
                ))
            }
        };
        Ok(Step { delay, content })
    }
}

fn build_menu(
    action: &str,
    title: Option<String>,
    options: Map<String, Value>,
) -> Result<Menu, DefinitionError> {
    let options = options
        .into_iter()
        .map(|(key, value)| {
            let raw: RawOption = serde_json::from_value(value).map_err(|e| {
                DefinitionError::shape(action, format!("menu option '{}': {}", key, e))
            })?;
            Ok(MenuOption {
                key,
                text: raw.texto,
                target: raw.acao,
            })
        })
        .collect::<Result<Vec<_>, DefinitionError>>()?;
    Ok(Menu {
        title: title.filter(|t| !t.is_empty()),
        options,
    })
}
