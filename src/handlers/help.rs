//! The help switchboard.

use super::{Context, Handler};
use crate::error::HandlerResult;
use async_trait::async_trait;
use std::collections::HashMap;

const HELP: &str = "```
available help topics:
    attr
    help
    init
    karma
    karma_newest
    karma_top
    karma_bottom
    roll

Try `!help [topic]` for information on a specific topic.
```";

/// Handler for the `!help` command.
///
/// Holds a snapshot of every registered handler's help text, keyed by
/// command keyword, taken when the registry is built.
pub struct HelpHandler {
    topics: HashMap<&'static str, &'static str>,
}

impl HelpHandler {
    /// Create the switchboard over the given topic table.
    pub fn new(topics: HashMap<&'static str, &'static str>) -> Self {
        Self { topics }
    }
}

#[async_trait]
impl Handler for HelpHandler {
    async fn run(&self, ctx: &Context<'_>, args: &str) -> HandlerResult {
        let topic = args.split_whitespace().next().unwrap_or("");

        match self.topics.get(topic) {
            Some(text) => ctx.post(text).await,
            None => ctx.post(HELP).await,
        }
    }

    fn help(&self) -> &'static str {
        HELP
    }
}
