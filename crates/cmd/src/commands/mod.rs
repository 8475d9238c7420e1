// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod describe;
pub mod exists;
pub mod list;
pub mod load;
pub mod save;
pub mod versions;

pub use describe::describe_command;
pub use exists::exists_command;
pub use list::list_command;
pub use load::load_command;
pub use save::save_command;
pub use versions::versions_command;
