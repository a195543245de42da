use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};
use tokio::time::Instant;

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Local>;

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: tokio::time::Instant);

    /// Current local calendar date. Every tally is keyed by this value.
    fn today(&self) -> NaiveDate {
        self.time().date_naive()
    }

    /// True once [Clock::today] no longer matches a previously observed date.
    fn has_rolled_over(&self, last_known: NaiveDate) -> bool {
        self.today() != last_known
    }
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: tokio::time::Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
    use tokio::time::Instant;

    use super::Clock;

    struct FrozenClock {
        now: chrono::DateTime<Local>,
    }

    #[async_trait::async_trait]
    impl Clock for FrozenClock {
        fn time(&self) -> chrono::DateTime<Local> {
            self.now
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, _instant: Instant) {}
    }

    fn clock_at(date: NaiveDate) -> FrozenClock {
        let midday = NaiveDateTime::new(date, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        FrozenClock {
            now: Local.from_local_datetime(&midday).unwrap(),
        }
    }

    #[test]
    fn today_is_the_calendar_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(clock_at(date).today(), date);
    }

    #[test]
    fn rollover_is_any_date_change() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let clock = clock_at(date);
        assert!(!clock.has_rolled_over(date));
        assert!(clock.has_rolled_over(date.pred_opt().unwrap()));
        assert!(clock.has_rolled_over(date.succ_opt().unwrap()));
    }
}
