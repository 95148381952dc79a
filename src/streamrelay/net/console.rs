use std::sync::Arc;

use log::{debug, error, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use crate::streamrelay::router::CommandRouter;
use crate::streamrelay::sender::MessageSender;
use crate::streamrelay::types::Recipient;

/// Treats every input line as a chat message from `caller`; replies go back through `sender`
pub async fn run_console<R>(
    input: R,
    router: Arc<CommandRouter>,
    sender: Arc<dyn MessageSender>,
    caller: Recipient,
    shutdown: CancellationToken,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    info!("Reading commands for {} from console", caller);
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("Console input closed");
            break;
        };

        // Subscribing writes to the store synchronously; keep that off the runtime threads
        let routed = {
            let router = router.clone();
            let caller = caller.clone();
            let line = line.clone();
            tokio::task::spawn_blocking(move || router.handle(&line, &caller)).await
        };
        let routed = match routed {
            Ok(routed) => routed,
            Err(e) => {
                error!("Command {:?} from {} aborted: {}", line, caller, e);
                continue;
            }
        };

        match routed {
            Some(reply) => {
                if let Err(e) = sender.send(&reply, &caller).await {
                    error!("Failed to send reply to {}: {}", caller, e);
                }
            }
            None => debug!("No route for {:?}", line),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::io::BufReader;

    use crate::error::DeliveryError;
    use crate::streamrelay::commands::SubscriptionCommandHandler;
    use crate::streamrelay::kv::{FileKeyValueStore, MemoryKeyValueStore};
    use crate::streamrelay::store::SubscriberStore;
    use crate::streamrelay::types::Topic;

    #[derive(Default)]
    struct Replies(Mutex<Vec<String>>);

    #[async_trait]
    impl MessageSender for Replies {
        async fn send(&self, text: &str, _to: &Recipient) -> Result<(), DeliveryError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn lines_are_routed_and_answered() {
        let store = Arc::new(SubscriberStore::new(Arc::new(MemoryKeyValueStore::new())));
        let handler = Arc::new(SubscriptionCommandHandler::new(store.clone(), "/twitch", true));
        let router = Arc::new(CommandRouter::new(handler, "/twitch"));
        let replies = Arc::new(Replies::default());
        let caller = Recipient::Individual("console".into());

        let input = BufReader::new(&b"/twitch,subscribe,foo\nnot a command\n/twitch,unsubscribe,foo\n"[..]);
        run_console(input, router, replies.clone(), caller.clone(), CancellationToken::new())
            .await
            .unwrap();

        let replies = replies.0.lock().unwrap();
        assert_eq!(replies.len(), 2);
        assert!(replies[0].starts_with("You are now subscribed"));
        assert_eq!(replies[1], "Sorry I don't allow you to unsubscribe yet lol :)");
        assert_eq!(store.lookup(&Topic::normalized("foo")), vec![caller]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn subscriptions_reach_disk_before_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscribers.json");
        let backend = Arc::new(FileKeyValueStore::open(&path).unwrap());
        let store = Arc::new(SubscriberStore::new(backend));
        let handler = Arc::new(SubscriptionCommandHandler::new(store, "/twitch", true));
        let router = Arc::new(CommandRouter::new(handler, "/twitch"));
        let replies = Arc::new(Replies::default());
        let caller = Recipient::Group("chat;=;9".into());

        let input = BufReader::new(&b"/twitch,subscribe,Foo\n"[..]);
        run_console(input, router, replies.clone(), caller.clone(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(replies.0.lock().unwrap().len(), 1);
        let reopened = SubscriberStore::new(Arc::new(FileKeyValueStore::open(&path).unwrap()));
        assert_eq!(reopened.lookup(&Topic::normalized("foo")), vec![caller]);
    }
}
