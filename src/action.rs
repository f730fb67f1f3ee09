#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    NextTab,
    PrevTab,
    Navigate(Direction),
    CycleSort,
    ReverseSort,
    RequestKill,
    ConfirmKill,
    CancelConfirm,
    ApplyPowerMode,
    ClearRamCache,
    ClearStorageCache,
    ToggleHelp,
    Refresh,
    None,
}
