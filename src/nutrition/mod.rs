pub mod energy;
pub mod macros;
pub mod notes;

pub use energy::{
    adjust_calories_for_goal, calculate_bmr, calculate_calorie_needs, EnergyProfile,
};
pub use macros::{macro_split_for_goal, MacroSplit, MacroTargets};
pub use notes::dietary_notes;
