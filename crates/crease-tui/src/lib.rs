// Terminal front end for the fantasy-cricket portal and admin console.

pub mod tui;
