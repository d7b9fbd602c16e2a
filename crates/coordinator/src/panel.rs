use super::*;
use bzr_core::Button;
use bzr_feedback::Rgb;
use bzr_feedback::Target;
use bzr_protocol::Selection;
use std::convert::Infallible;
use std::sync::Arc;

/// The coordinator's two hardware buttons.
/// Holding one acts on every player, like `{"enable":[-1]}` or
/// `{"disable":[-1]}` typed on the console.
#[derive(Clone)]
pub struct Panel {
    enable_all: Arc<dyn Button>,
    disable_all: Arc<dyn Button>,
}

impl Panel {
    pub fn new(enable_all: Arc<dyn Button>, disable_all: Arc<dyn Button>) -> Self {
        Self {
            enable_all,
            disable_all,
        }
    }

    pub(crate) async fn run(self, context: Context) -> anyhow::Result<Infallible> {
        loop {
            let action = match (self.enable_all.is_low(), self.disable_all.is_low()) {
                (true, _) => Some((true, Rgb::GREEN)),
                (false, true) => Some((false, Rgb::RED)),
                (false, false) => None,
            };
            match action {
                Some((enabled, color)) => {
                    log::info!(
                        "[panel] {} all",
                        if enabled { "enable" } else { "disable" }
                    );
                    context.apply(&Selection::All, enabled).await;
                    context.feedback.blink(Target::Buzz, color, 2);
                    tokio::time::sleep(context.config.panel_holdoff).await;
                }
                None => tokio::time::sleep(context.config.panel_poll).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzr_core::Address;
    use bzr_core::Epoch;
    use bzr_core::Pin;
    use bzr_feedback::Strip;
    use bzr_protocol::Message;
    use bzr_protocol::Protocol;
    use bzr_radio::Ether;
    use bzr_radio::Radio;
    use std::time::Duration;
    use tokio::time::Instant;
    #[tokio::test(start_paused = true)]
    async fn buttons_act_on_everyone() {
        let ether = Ether::new();
        let radio = Arc::new(ether.join(Address::new([0x02, 0, 0, 0, 0, 0xc0])));
        let player = Address::new([0x02, 0, 0, 0, 0, 1]);
        let handset = ether.join(player);
        radio.ensure_peer(player);
        let context = Context::detached(radio, Strip::new(6).shared(), Epoch::new(1));
        let directory = context.directory.clone();
        directory.lock().await.register(player, "Red", Instant::now());
        let enable = Pin::pulled_up();
        let disable = Pin::pulled_up();
        let panel = Panel::new(Arc::new(enable.clone()), Arc::new(disable.clone()));
        tokio::spawn(panel.run(context));
        disable.press();
        let frame = handset.recv().await.unwrap();
        assert_eq!(Protocol::decode(&frame.payload), Ok(Message::Disable));
        assert!(!directory.lock().await.get(0).unwrap().is_enabled());
        disable.release();
        enable.press();
        let frame = handset.recv().await.unwrap();
        assert_eq!(Protocol::decode(&frame.payload), Ok(Message::Enable));
        enable.release();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(directory.lock().await.get(0).unwrap().is_enabled());
    }
}
