use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notice stays on screen.
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(3);

/// Visual class of a notice.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NoticeKind {
    Info,
    Warning,
}

/// One transient, non-blocking on-screen message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    created: Instant,
}

/// Queue of transient notices; expired entries are pruned on read.
///
/// This is the raw-mode substitute for log lines: persistence failures and
/// save/load acknowledgements surface here without interrupting gameplay.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: VecDeque<Notice>,
}

impl NoticeBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message.into(), NoticeKind::Info);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(message.into(), NoticeKind::Warning);
    }

    fn push(&mut self, message: String, kind: NoticeKind) {
        self.notices.push_back(Notice {
            message,
            kind,
            created: Instant::now(),
        });
        // Keep the stack shallow; old entries are superseded anyway.
        while self.notices.len() > 3 {
            self.notices.pop_front();
        }
    }

    /// Returns the notices still within their lifetime at `now`.
    pub fn active(&mut self, now: Instant) -> impl Iterator<Item = &Notice> {
        while let Some(front) = self.notices.front() {
            if now.duration_since(front.created) >= NOTICE_LIFETIME {
                self.notices.pop_front();
            } else {
                break;
            }
        }
        self.notices.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{NoticeBoard, NOTICE_LIFETIME};

    #[test]
    fn notices_expire_after_their_lifetime() {
        let mut board = NoticeBoard::new();
        board.info("saved");

        let now = Instant::now();
        assert_eq!(board.active(now).count(), 1);

        let later = now + NOTICE_LIFETIME + Duration::from_millis(1);
        assert_eq!(board.active(later).count(), 0);
    }

    #[test]
    fn board_keeps_only_the_newest_three() {
        let mut board = NoticeBoard::new();
        for i in 0..5 {
            board.warn(format!("notice {i}"));
        }

        let messages: Vec<_> = board
            .active(Instant::now())
            .map(|n| n.message.clone())
            .collect();
        assert_eq!(messages, vec!["notice 2", "notice 3", "notice 4"]);
    }
}
