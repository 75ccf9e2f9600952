/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and messages.

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum GameEvent {
    PlayerMoved { x: usize, y: usize },
    SwitchPressed { id: char, x: usize, y: usize },
    DoorUnlocked { id: char, x: usize, y: usize },
    GoalUnlocked,
    SlideStarted,
    SlideStopped,
    /// Player stepped onto an unlocked goal.
    RoomSolved,
    RoomReset,
    LevelStarted { index: usize },
    GameComplete,
}
