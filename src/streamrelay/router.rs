use std::sync::Arc;

use log::{debug, info};

use crate::error::CommandError;
use crate::streamrelay::commands::SubscriptionCommandHandler;
use crate::streamrelay::dice;
use crate::streamrelay::types::Recipient;

/// Separator between command parameters
pub const PARAM_DELIMITER: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Subscription,
    DiceRoll,
    Help,
}

/// One entry of the command table
#[derive(Debug, Clone)]
pub struct Route {
    pub name: &'static str,
    pub prefix: String,
    pub description: String,
    action: Action,
}

/// Prefix-matched command table for incoming chat text
pub struct CommandRouter {
    routes: Vec<Route>,
    subscriptions: Arc<SubscriptionCommandHandler>,
}

impl CommandRouter {
    pub fn new(subscriptions: Arc<SubscriptionCommandHandler>, trigger: &str) -> Self {
        let routes = vec![
            Route {
                name: "Subscribe to twitch notifications",
                prefix: trigger.to_string(),
                description: format!(
                    "Subscribe to notifications from a twitch streamer. {},subscribe,username",
                    trigger
                ),
                action: Action::Subscription,
            },
            Route {
                name: "Roll a die",
                prefix: "/roll".to_string(),
                description: "Roll x y sided die. /roll,xdy".to_string(),
                action: Action::DiceRoll,
            },
            Route {
                name: "Help",
                prefix: "/help".to_string(),
                description: "List available commands. /help".to_string(),
                action: Action::Help,
            },
        ];

        Self { routes, subscriptions }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Splits raw command text into its parameters
    pub fn parameters(text: &str) -> Vec<String> {
        text.trim().split(PARAM_DELIMITER).map(str::to_string).collect()
    }

    /// Runs the first route whose prefix matches; `None` if nothing matched
    pub fn handle(&self, text: &str, caller: &Recipient) -> Option<String> {
        let text = text.trim();
        let route = self.routes.iter().find(|r| text.starts_with(r.prefix.as_str()))?;
        info!("Routing {:?} from {} to '{}'", text, caller, route.name);

        let params = Self::parameters(text);
        let result = match route.action {
            Action::Subscription => self.subscriptions.handle(&params, caller),
            Action::DiceRoll => dice::roll(&params),
            Action::Help => Ok(self.help()),
        };

        Some(result.unwrap_or_else(|e: CommandError| {
            debug!("Command {:?} rejected: {:?} ({})", text, e, e.code());
            e.reply()
        }))
    }

    /// One line per route: name and usage
    pub fn help(&self) -> String {
        self.routes
            .iter()
            .map(|r| format!("{}: {}", r.name, r.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
