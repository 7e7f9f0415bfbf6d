// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel token buckets.

use std::collections::HashMap;

use courier_core::Channel;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Bucket {
    capacity: f64,
    refill_per_sec: f64,
    tokens: f64,
    last_refill: Instant,
}

/// Token buckets keyed by channel. Channels without a bucket are unlimited.
#[derive(Default)]
pub struct ChannelLimits {
    buckets: Mutex<HashMap<Channel, Bucket>>,
}

impl ChannelLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `per_minute` sends on `channel`, bursting up to the same amount.
    pub fn with_limit(mut self, channel: Channel, per_minute: u32) -> Self {
        let capacity = f64::from(per_minute);
        self.buckets.get_mut().insert(
            channel,
            Bucket {
                capacity,
                refill_per_sec: capacity / 60.0,
                tokens: capacity,
                last_refill: Instant::now(),
            },
        );
        self
    }

    /// Take one token for `channel`. `false` means the send must not happen.
    pub async fn try_acquire(&self, channel: Channel) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        let Some(bucket) = buckets.get_mut(&channel) else {
            return true;
        };
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.last_refill = now;
        bucket.tokens = (bucket.tokens + elapsed * bucket.refill_per_sec).min(bucket.capacity);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn unlimited_channel_always_passes() {
        let limits = ChannelLimits::new().with_limit(Channel::Sms, 1);
        for _ in 0..10 {
            assert!(limits.try_acquire(Channel::WhatsApp).await);
        }
        assert!(limits.try_acquire(Channel::Sms).await);
        assert!(!limits.try_acquire(Channel::Sms).await);
    }

    #[tokio::test(start_paused = true)]
    async fn bucket_drains_and_refills() {
        let limits = ChannelLimits::new().with_limit(Channel::Sms, 2);
        assert!(limits.try_acquire(Channel::Sms).await);
        assert!(limits.try_acquire(Channel::Sms).await);
        assert!(!limits.try_acquire(Channel::Sms).await);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(limits.try_acquire(Channel::Sms).await);
        assert!(!limits.try_acquire(Channel::Sms).await);
    }
}
