//! # Render Proxy
//!
//! The render thread never touches barriers. Components copy what the
//! renderer needs into plain frames on the owner thread and send them over
//! a bounded channel; the render thread drains whatever is newest.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Render-side copy of a steering component
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringRenderData {
    pub name: String,
    pub enabled: bool,
    /// Degrees
    pub steering_angle: f64,
    /// Degrees, one per wheel joint
    pub left_wheel_angle: f64,
    pub right_wheel_angle: f64,
}

/// Owner-thread end of a render proxy channel
#[derive(Clone)]
pub struct RenderProxySender<D> {
    sender: Sender<D>,
}

/// Render-thread end of a render proxy channel
pub struct RenderProxyReceiver<D> {
    receiver: Receiver<D>,
}

/// Create a proxy channel holding at most `capacity` pending frames
pub fn render_proxy_channel<D>(capacity: usize) -> (RenderProxySender<D>, RenderProxyReceiver<D>) {
    let (sender, receiver) = bounded(capacity.max(1));
    (RenderProxySender { sender }, RenderProxyReceiver { receiver })
}

impl<D> RenderProxySender<D> {
    /// Queue a frame. Returns false if the frame was dropped because the
    /// render thread is behind or gone.
    pub fn submit(&self, frame: D) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::trace!("Render proxy full, dropping frame");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl<D> RenderProxyReceiver<D> {
    /// Take every pending frame and keep only the newest
    pub fn drain_latest(&self) -> Option<D> {
        self.receiver.try_iter().last()
    }

    /// Number of frames waiting
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(angle: f64) -> SteeringRenderData {
        SteeringRenderData {
            name: "FrontAxle".to_string(),
            enabled: true,
            steering_angle: angle,
            left_wheel_angle: angle,
            right_wheel_angle: angle,
        }
    }

    #[test]
    fn test_drain_keeps_newest() {
        let (sender, receiver) = render_proxy_channel(4);
        assert!(sender.submit(frame(1.0)));
        assert!(sender.submit(frame(2.0)));
        assert_eq!(receiver.pending(), 2);

        assert_eq!(receiver.drain_latest().unwrap().steering_angle, 2.0);
        assert!(receiver.drain_latest().is_none());
    }

    #[test]
    fn test_full_channel_drops_frames() {
        let (sender, receiver) = render_proxy_channel(1);
        assert!(sender.submit(frame(1.0)));
        assert!(!sender.submit(frame(2.0)));
        assert_eq!(receiver.drain_latest().unwrap().steering_angle, 1.0);
    }

    #[test]
    fn test_frames_cross_threads() {
        let (sender, receiver) = render_proxy_channel(8);
        let render = std::thread::spawn(move || {
            let mut last = None;
            while last.is_none() {
                last = receiver.drain_latest();
                std::thread::yield_now();
            }
            last
        });

        sender.submit(frame(15.0));
        let received = render.join().unwrap().unwrap();
        assert_eq!(received.steering_angle, 15.0);
    }
}
