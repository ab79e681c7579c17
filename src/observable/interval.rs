use crate::{
  observable::Observable,
  scheduler::{Duration, SchedulerRef},
};

impl Observable<u64> {
  /// Emits `1, 2, 3, ...`: the first value right after subscribing, then
  /// one every `period`, on the background scheduler. Never completes.
  pub fn interval(period: Duration) -> Self {
    Observable::interval_on(period, SchedulerRef::background_thread())
  }

  /// [`interval`](Self::interval) on an explicit scheduler.
  pub fn interval_on(period: Duration, scheduler: SchedulerRef) -> Self {
    Observable::create(move |s| {
      let mut counter = 0;
      let emitter = s.clone();
      let handle = scheduler.schedule_periodic(period, None, move || {
        counter += 1;
        emitter.next(counter);
      });
      s.add(handle);
    })
  }
}
