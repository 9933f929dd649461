//! Centralized icon definitions.
//!
//! The theme is picked in `config.rs` via `ICON_THEME`; components only use
//! the semantic names below.

use icondata::Icon;

use crate::config::IconTheme;

mod lucide {
    pub use icondata::{
        LuArchive as Archive, LuChevronRight as ChevronRight, LuClipboardPaste as Paste,
        LuCopy as Copy, LuDownload as Download, LuFile as File, LuFilePlus as NewFile,
        LuFolder as Folder, LuFolderOpen as Files, LuFolderPlus as NewFolder, LuHouse as Home,
        LuPencil as Edit, LuPlay as Start, LuPlus as Plus, LuRefreshCw as Refresh,
        LuRotateCw as Restart, LuSave as Save, LuScissors as Cut, LuServer as Server,
        LuSettings as Settings, LuSkull as Kill, LuSquare as Stop, LuTerminal as Terminal,
        LuTrash2 as Trash, LuUpload as Upload, LuWifi as Online, LuWifiOff as Offline,
        LuX as Close,
    };
}

mod bootstrap {
    pub use icondata::{
        BsArrowClockwise as Restart, BsArrowRepeat as Refresh, BsChevronRight as ChevronRight,
        BsClipboard as Paste, BsDownload as Download, BsFileEarmark as File,
        BsFileEarmarkPlus as NewFile, BsFileEarmarkZip as Archive, BsFiles as Copy,
        BsFolder2Open as Files, BsFolderFill as Folder, BsFolderPlus as NewFolder,
        BsGear as Settings, BsHddStack as Server, BsHouseFill as Home, BsPencil as Edit,
        BsPlayFill as Start, BsPlusLg as Plus, BsSave as Save, BsScissors as Cut,
        BsStopFill as Stop, BsTerminal as Terminal, BsTrash as Trash, BsUpload as Upload,
        BsWifi as Online, BsWifiOff as Offline, BsXLg as Close, BsXOctagon as Kill,
    };
}

macro_rules! themed_icon {
    ($name:ident, $theme_name:ident) => {
        pub const $name: Icon = match crate::config::ICON_THEME {
            IconTheme::Lucide => lucide::$theme_name,
            IconTheme::Bootstrap => bootstrap::$theme_name,
        };
    };
}

themed_icon!(ARCHIVE, Archive);
themed_icon!(CHEVRON_RIGHT, ChevronRight);
themed_icon!(CLOSE, Close);
themed_icon!(COPY, Copy);
themed_icon!(CUT, Cut);
themed_icon!(DOWNLOAD, Download);
themed_icon!(EDIT, Edit);
themed_icon!(FILE, File);
themed_icon!(FILES, Files);
themed_icon!(FOLDER, Folder);
themed_icon!(HOME, Home);
themed_icon!(KILL, Kill);
themed_icon!(NEW_FILE, NewFile);
themed_icon!(NEW_FOLDER, NewFolder);
themed_icon!(OFFLINE, Offline);
themed_icon!(ONLINE, Online);
themed_icon!(PASTE, Paste);
themed_icon!(PLUS, Plus);
themed_icon!(REFRESH, Refresh);
themed_icon!(RESTART, Restart);
themed_icon!(SAVE, Save);
themed_icon!(SERVER, Server);
themed_icon!(SETTINGS, Settings);
themed_icon!(START, Start);
themed_icon!(STOP, Stop);
themed_icon!(TERMINAL, Terminal);
themed_icon!(TRASH, Trash);
themed_icon!(UPLOAD, Upload);
