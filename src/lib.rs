// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
//! Scene-based control of ArtNet and serial DMX lighting devices.
//!
//! Each device owns a 512 channel universe and a catalog of named scenes.
//! Operators select scenes, override channels, save edits back into the
//! current scene and black devices out; every live change is transmitted.
pub mod config;
pub mod device;
pub mod driver;
pub mod executor;
pub mod transport;
