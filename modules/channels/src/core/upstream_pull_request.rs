/// Information handed to a pull strategy when the composition touches its upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamPullRequest {
  /// The upstream produced a value and a child was created for it.
  Pulled {
    /// Children waiting in the queue, not counting the newly created one.
    active_children: usize,
  },
  /// The upstream finished while children are still queued.
  NoUpstream {
    /// Children waiting in the queue.
    active_children: usize,
  },
}
