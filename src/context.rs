use crate::dev::{BlockDevice, DateTime, Nic, Rtc};
use crate::fs::{FileSystem, FsResult, path};
use crate::net::NetworkStack;

pub type Disk = Box<dyn BlockDevice>;
pub type Interface = Box<dyn Nic>;

/// What the shell loop should do once the current command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Active,
    Logout,
    Reboot,
    Shutdown,
}

pub struct Context {
    pub(crate) fs: FileSystem<Disk>,
    pub(crate) net: NetworkStack<Interface>,
    rtc: Box<dyn Rtc>,
    cwd: String,
    user: String,
    clock_offset: i64,
    session: Session,
}

impl Context {
    pub fn new(fs: FileSystem<Disk>, net: NetworkStack<Interface>, rtc: Box<dyn Rtc>) -> Self {
        let user = fs.username();
        Self {
            fs,
            net,
            rtc,
            cwd: "/".to_string(),
            user,
            clock_offset: 0,
            session: Session::Active,
        }
    }

    /// Resets per-login state after the user has authenticated.
    pub fn login(&mut self) {
        self.user = self.fs.username();
        self.cwd = "/".to_string();
        self.session = Session::Active;
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn set_cwd(&mut self, dir: String) {
        self.cwd = dir;
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn hostname(&self) -> String {
        self.fs.hostname()
    }

    pub fn home(&self) -> String {
        format!("/home/{}", self.user)
    }

    /// Absolute form of a path typed at the prompt.
    pub fn resolve(&self, path: &str) -> String {
        path::join(&self.cwd, path)
    }

    /// Wall clock corrected by the last successful `ntpdate`.
    pub fn now(&self) -> u32 {
        let raw = i64::from(self.rtc.unix_timestamp()) + self.clock_offset;
        raw.clamp(0, i64::from(u32::MAX)) as u32
    }

    pub fn local_time(&self) -> DateTime {
        DateTime::from_unix(u64::from(self.now()))
    }

    pub fn rtc_time(&self) -> u32 {
        self.rtc.unix_timestamp()
    }

    /// Adopts `server_time` as the current time from now on.
    pub fn set_clock(&mut self, server_time: u32) {
        self.clock_offset = i64::from(server_time) - i64::from(self.rtc.unix_timestamp());
    }

    /// Writes the cached filesystem metadata back to the disk.
    pub fn sync(&mut self) -> FsResult<()> {
        self.fs.flush()
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }
}
