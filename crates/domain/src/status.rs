//! Two-valued status vocabularies.
//!
//! Every device type has exactly two valid statuses. Storing the status as
//! one of these enums makes an out-of-vocabulary status unrepresentable.

use crate::choice::define_choice;
use crate::drift;

define_choice!(
    /// Status of powered devices (water heater, light, air conditioner).
    Power("status") {
        #[default]
        Off => "off",
        On => "on",
    }
);

define_choice!(
    /// Status of a curtain.
    CurtainStatus("status") {
        #[default]
        Closed => "closed",
        Open => "open",
    }
);

define_choice!(
    /// Status of a door lock.
    LockStatus("status") {
        #[default]
        Unlocked => "unlocked",
        Locked => "locked",
    }
);

macro_rules! impl_toggle {
    ($($name:ident),+) => {
        $(
            impl $name {
                /// The other status of the pair.
                #[must_use]
                pub fn toggled(self) -> Self {
                    drift::complement(Self::ALL, self)
                        .first()
                        .copied()
                        .unwrap_or(self)
                }
            }
        )+
    };
}

impl_toggle!(Power, CurtainStatus, LockStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_toggle_power() {
        assert_eq!(Power::On.toggled(), Power::Off);
        assert_eq!(Power::Off.toggled(), Power::On);
    }

    #[test]
    fn should_toggle_curtain_and_lock() {
        assert_eq!(CurtainStatus::Open.toggled(), CurtainStatus::Closed);
        assert_eq!(LockStatus::Unlocked.toggled(), LockStatus::Locked);
    }

    #[test]
    fn should_default_to_resting_status() {
        assert_eq!(Power::default(), Power::Off);
        assert_eq!(CurtainStatus::default(), CurtainStatus::Closed);
        assert_eq!(LockStatus::default(), LockStatus::Unlocked);
    }

    #[test]
    fn should_reject_status_of_another_type() {
        assert!("open".parse::<Power>().is_err());
        assert!("on".parse::<LockStatus>().is_err());
        assert!("locked".parse::<CurtainStatus>().is_err());
    }
}
