// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # Ticket expiration policies
//!
//! The policy is a pure function of the ticket usage state and the current
//! time. It is evaluated on every access, the only state cached on the ticket
//! is the irreversible `expired` flag. The policy is persisted together with
//! the ticket so that every node of the cluster evaluates the same policy.
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::ticket::types::TicketMetadata;

/// Ticket expiration policy.
///
/// All durations are in seconds. A duration of `0` makes a fresh ticket
/// immediately expired.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpirationPolicy {
    /// The ticket never expires. Only suitable for testing.
    NeverExpires,

    /// Absolute lifetime counted from the ticket creation.
    HardTimeout { time_to_kill_in_seconds: i64 },

    /// Sliding lifetime counted from the last use.
    Timeout { time_to_kill_in_seconds: i64 },

    /// Idle timeout counted from the last use, capped by the hard ceiling
    /// counted from the creation.
    TicketGrantingTicket {
        max_time_to_live_in_seconds: i64,
        time_to_kill_in_seconds: i64,
    },

    /// Expires after the number of uses or when the lifetime counted from the
    /// creation passes, whatever comes first.
    MultiTimeUseOrTimeout {
        number_of_uses: u32,
        time_to_kill_in_seconds: i64,
    },

    /// Idle timeout counted from the last use. Using the ticket again before
    /// `time_in_between_uses_in_seconds` passed since the last use is refused
    /// by reporting the ticket as expired.
    ThrottledUseAndTimeout {
        time_in_between_uses_in_seconds: i64,
        time_to_kill_in_seconds: i64,
    },

    /// Delegates to the `remember_me` policy when the authentication of the
    /// ticket carries the "remember me" flag and to the `session` policy
    /// otherwise.
    RememberMeDelegating {
        remember_me: Box<ExpirationPolicy>,
        session: Box<ExpirationPolicy>,
    },
}

impl ExpirationPolicy {
    /// Whether the ticket described by the metadata is expired at the given
    /// time.
    pub fn is_expired(&self, meta: &TicketMetadata, remember_me: bool, now: DateTime<Utc>) -> bool {
        match self {
            Self::NeverExpires => false,
            Self::HardTimeout {
                time_to_kill_in_seconds,
            } => elapsed(meta.creation_time, now, *time_to_kill_in_seconds),
            Self::Timeout {
                time_to_kill_in_seconds,
            } => elapsed(meta.last_time_used, now, *time_to_kill_in_seconds),
            Self::TicketGrantingTicket {
                max_time_to_live_in_seconds,
                time_to_kill_in_seconds,
            } => {
                elapsed(meta.creation_time, now, *max_time_to_live_in_seconds)
                    || elapsed(meta.last_time_used, now, *time_to_kill_in_seconds)
            }
            Self::MultiTimeUseOrTimeout {
                number_of_uses,
                time_to_kill_in_seconds,
            } => {
                meta.count_of_uses >= *number_of_uses
                    || elapsed(meta.creation_time, now, *time_to_kill_in_seconds)
            }
            Self::ThrottledUseAndTimeout {
                time_in_between_uses_in_seconds,
                time_to_kill_in_seconds,
            } => {
                if elapsed(meta.last_time_used, now, *time_to_kill_in_seconds) {
                    return true;
                }
                if meta.count_of_uses == 0 {
                    return false;
                }
                // throttled while within the window since the last use
                !elapsed(meta.last_time_used, now, *time_in_between_uses_in_seconds)
            }
            Self::RememberMeDelegating {
                remember_me: remember_me_policy,
                session,
            } => {
                if remember_me {
                    remember_me_policy.is_expired(meta, remember_me, now)
                } else {
                    session.is_expired(meta, remember_me, now)
                }
            }
        }
    }
}

/// Whether at least `seconds` passed between `since` and `now`.
///
/// Durations not representable by [TimeDelta] never elapse.
fn elapsed(since: DateTime<Utc>, now: DateTime<Utc>, seconds: i64) -> bool {
    TimeDelta::try_seconds(seconds).is_some_and(|ttl| now.signed_duration_since(since) >= ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(policy: ExpirationPolicy, now: DateTime<Utc>) -> TicketMetadata {
        TicketMetadata::new_at("ST-1-test", policy, now)
    }

    #[test]
    fn test_zero_ttl_immediately_expired() {
        let now = Utc::now();
        for policy in [
            ExpirationPolicy::HardTimeout {
                time_to_kill_in_seconds: 0,
            },
            ExpirationPolicy::Timeout {
                time_to_kill_in_seconds: 0,
            },
            ExpirationPolicy::TicketGrantingTicket {
                max_time_to_live_in_seconds: 0,
                time_to_kill_in_seconds: 0,
            },
            ExpirationPolicy::MultiTimeUseOrTimeout {
                number_of_uses: 5,
                time_to_kill_in_seconds: 0,
            },
        ] {
            let m = meta(policy.clone(), now);
            assert!(policy.is_expired(&m, false, now), "{policy:?}");
        }
    }

    #[test]
    fn test_never_expires() {
        let now = Utc::now();
        let m = meta(ExpirationPolicy::NeverExpires, now);
        assert!(!ExpirationPolicy::NeverExpires.is_expired(
            &m,
            false,
            now + TimeDelta::days(365 * 100)
        ));
    }

    #[test]
    fn test_hard_timeout() {
        let now = Utc::now();
        let policy = ExpirationPolicy::HardTimeout {
            time_to_kill_in_seconds: 10,
        };
        let mut m = meta(policy.clone(), now);
        m.update(now + TimeDelta::seconds(9));
        assert!(!policy.is_expired(&m, false, now + TimeDelta::seconds(9)));
        // usage does not extend the lifetime
        assert!(policy.is_expired(&m, false, now + TimeDelta::seconds(10)));
    }

    #[test]
    fn test_sliding_timeout() {
        let now = Utc::now();
        let policy = ExpirationPolicy::Timeout {
            time_to_kill_in_seconds: 10,
        };
        let mut m = meta(policy.clone(), now);
        m.update(now + TimeDelta::seconds(8));
        assert!(!policy.is_expired(&m, false, now + TimeDelta::seconds(15)));
        assert!(policy.is_expired(&m, false, now + TimeDelta::seconds(18)));
    }

    #[test]
    fn test_ticket_granting_policy() {
        let now = Utc::now();
        let policy = ExpirationPolicy::TicketGrantingTicket {
            max_time_to_live_in_seconds: 100,
            time_to_kill_in_seconds: 20,
        };
        let mut m = meta(policy.clone(), now);
        assert!(!policy.is_expired(&m, false, now + TimeDelta::seconds(19)));
        assert!(policy.is_expired(&m, false, now + TimeDelta::seconds(20)));

        // keep it alive by using it
        for i in 1..=5 {
            m.update(now + TimeDelta::seconds(i * 18));
        }
        assert!(!policy.is_expired(&m, false, now + TimeDelta::seconds(99)));
        // hard ceiling
        m.update(now + TimeDelta::seconds(99));
        assert!(policy.is_expired(&m, false, now + TimeDelta::seconds(100)));
    }

    #[test]
    fn test_multi_use() {
        let now = Utc::now();
        let policy = ExpirationPolicy::MultiTimeUseOrTimeout {
            number_of_uses: 2,
            time_to_kill_in_seconds: 10,
        };
        let mut m = meta(policy.clone(), now);
        assert!(!policy.is_expired(&m, false, now));
        m.update(now);
        assert!(!policy.is_expired(&m, false, now));
        m.update(now);
        assert!(policy.is_expired(&m, false, now));

        let m = meta(policy.clone(), now);
        assert!(policy.is_expired(&m, false, now + TimeDelta::seconds(11)));
    }

    #[test]
    fn test_throttled() {
        let now = Utc::now();
        let policy = ExpirationPolicy::ThrottledUseAndTimeout {
            time_in_between_uses_in_seconds: 5,
            time_to_kill_in_seconds: 60,
        };
        let mut m = meta(policy.clone(), now);
        assert!(!policy.is_expired(&m, false, now));
        m.update(now);
        // used again too soon
        assert!(policy.is_expired(&m, false, now + TimeDelta::seconds(2)));
        assert!(!policy.is_expired(&m, false, now + TimeDelta::seconds(6)));
        assert!(policy.is_expired(&m, false, now + TimeDelta::seconds(61)));
    }

    #[test]
    fn test_remember_me() {
        let now = Utc::now();
        let policy = ExpirationPolicy::RememberMeDelegating {
            remember_me: Box::new(ExpirationPolicy::HardTimeout {
                time_to_kill_in_seconds: 1000,
            }),
            session: Box::new(ExpirationPolicy::HardTimeout {
                time_to_kill_in_seconds: 10,
            }),
        };
        let m = meta(policy.clone(), now);
        let later = now + TimeDelta::seconds(100);
        assert!(!policy.is_expired(&m, true, later));
        assert!(policy.is_expired(&m, false, later));
    }

    #[test]
    fn test_overflowing_duration() {
        let now = Utc::now();
        let policy = ExpirationPolicy::HardTimeout {
            time_to_kill_in_seconds: i64::MAX,
        };
        let m = meta(policy.clone(), now);
        assert!(!policy.is_expired(&m, false, now + TimeDelta::days(1000)));
    }

    #[test]
    fn test_serde() {
        let policy = ExpirationPolicy::RememberMeDelegating {
            remember_me: Box::new(ExpirationPolicy::NeverExpires),
            session: Box::new(ExpirationPolicy::TicketGrantingTicket {
                max_time_to_live_in_seconds: 100,
                time_to_kill_in_seconds: 20,
            }),
        };
        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!("remember_me_delegating", json["type"]);
        assert_eq!("ticket_granting_ticket", json["session"]["type"]);
        assert_eq!(
            policy,
            serde_json::from_value::<ExpirationPolicy>(json).unwrap()
        );
    }
}
