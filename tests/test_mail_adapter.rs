use std::{cell::RefCell, collections::HashMap};

use sieve_delivery_lib::{
    backend::remote, bitmask_of, sender, Action, AuthToken, DeliveryState, Flag, Flags, ItemId,
    MailAdapter, MailboxStore, MemoryMailbox, ParsedMessage, RemoteConnector, RemoteFolder, RemoteSession,
    Sender, SharedDeliveryContext, SpamConfig, SpamDetector, Tags, BITMASK_UNREAD, FLAG_FLAGGED,
    FLAG_UNREAD, ID_FOLDER_INBOX, ID_FOLDER_SPAM,
};

fn init_logger() {
    env_logger::builder().is_test(true).try_init().ok();
}

fn plain_message() -> ParsedMessage {
    ParsedMessage::from_bytes(&include_bytes!("./emails/alice-to-bob.eml")[..]).unwrap()
}

fn spam_message() -> ParsedMessage {
    ParsedMessage::from_bytes(&include_bytes!("./emails/spam-to-bob.eml")[..]).unwrap()
}

fn spam_detector() -> SpamDetector {
    SpamDetector::new(&SpamConfig {
        header: Some("X-Spam-Flag".into()),
        header_value: Some("YES".into()),
    })
    .unwrap()
}

fn folder_ids(adapter: &MailAdapter) -> Vec<u32> {
    adapter
        .processed_messages()
        .iter()
        .map(|msg| msg.folder_id)
        .collect()
}

/// Represents a remote mailbox holding folders by path.
#[derive(Default)]
struct FakeRemote {
    paths: Vec<String>,
    mounts: HashMap<ItemId, String>,
    reject_auth: bool,
    tokens: RefCell<Vec<(String, String)>>,
    appended: RefCell<Vec<(String, Flags, Vec<u8>)>>,
}

impl FakeRemote {
    fn find(&self, path: &str) -> Option<RemoteFolder> {
        self.paths
            .iter()
            .find(|p| p.as_str() == path)
            .map(|path| RemoteFolder {
                id: path.to_owned(),
                path: path.to_owned(),
                delim: String::from("/"),
            })
    }
}

impl RemoteConnector for FakeRemote {
    fn connect(
        &self,
        token: &AuthToken,
        owner_id: &str,
    ) -> remote::Result<Box<dyn RemoteSession + '_>> {
        if self.reject_auth {
            return Err(remote::Error::AuthenticateError(owner_id.to_owned()));
        }

        self.tokens
            .borrow_mut()
            .push((token.as_str().to_owned(), owner_id.to_owned()));
        Ok(Box::new(FakeSession { remote: self }))
    }
}

struct FakeSession<'a> {
    remote: &'a FakeRemote,
}

impl RemoteSession for FakeSession<'_> {
    fn get_folder_by_id(&mut self, id: &ItemId) -> remote::Result<Option<RemoteFolder>> {
        Ok(self
            .remote
            .mounts
            .get(id)
            .and_then(|path| self.remote.find(path)))
    }

    fn get_subfolder_by_path(
        &mut self,
        parent: &RemoteFolder,
        path: &str,
    ) -> remote::Result<Option<RemoteFolder>> {
        Ok(self
            .remote
            .find(&format!("{}{}{}", parent.path, parent.delim, path)))
    }

    fn add_message(
        &mut self,
        folder: &RemoteFolder,
        flags: &Flags,
        email: &[u8],
    ) -> remote::Result<()> {
        self.remote
            .appended
            .borrow_mut()
            .push((folder.path.clone(), flags.clone(), email.to_vec()));
        Ok(())
    }
}

/// Represents a sender keeping what it sends.
struct RecordingSender<'a>(&'a RefCell<Vec<(String, Vec<u8>)>>);

impl Sender for RecordingSender<'_> {
    fn send(&mut self, email: &[u8], rcpt: &str) -> sender::Result<()> {
        self.0.borrow_mut().push((rcpt.to_owned(), email.to_vec()));
        Ok(())
    }
}

struct FailingSender;

impl Sender for FailingSender {
    fn send(&mut self, _email: &[u8], rcpt: &str) -> sender::Result<()> {
        Err(sender::Error::SenderMissingError(rcpt.to_owned()))
    }
}

#[test]
fn test_discard() {
    init_logger();

    let mbox = MemoryMailbox::new("bob");
    let msg = plain_message();
    let detector = spam_detector();
    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector);

    assert!(adapter.execute_actions().unwrap().is_empty());
    assert_eq!(DeliveryState::Done, adapter.state());
    assert!(mbox.messages().unwrap().is_empty());
}

#[test]
fn test_default_filing_on_side_effects_only() {
    init_logger();

    let mbox = MemoryMailbox::new("bob");
    let work = mbox.create_tag("work").unwrap();
    let detector = spam_detector();

    // not spam: Inbox
    let msg = plain_message();
    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector);
    adapter.set_actions(vec![Action::tag("work"), Action::set_flag(FLAG_FLAGGED)]);
    let stored = adapter.execute_actions().unwrap().to_vec();
    assert_eq!(1, stored.len());
    assert_eq!(ID_FOLDER_INBOX, stored[0].folder_id);
    assert_eq!(BITMASK_UNREAD | bitmask_of(FLAG_FLAGGED), stored[0].flags);
    assert_eq!(Tags::from_iter([work.id]), stored[0].tags);

    // spam: Junk
    let msg = spam_message();
    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector);
    adapter.set_actions(vec![Action::tag("work")]);
    assert_eq!(1, adapter.execute_actions().unwrap().len());
    assert_eq!(vec![ID_FOLDER_SPAM], folder_ids(&adapter));

    // unknown actions only count as side effects
    let msg = plain_message();
    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector);
    adapter.set_actions(vec![Action::Other(String::from("vacation"))]);
    assert_eq!(1, adapter.execute_actions().unwrap().len());
    assert_eq!(vec![ID_FOLDER_INBOX], folder_ids(&adapter));
}

#[test]
fn test_keep_and_spam() {
    init_logger();

    let mbox = MemoryMailbox::new("bob");
    let msg = spam_message();
    let detector = spam_detector();

    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector);
    assert!(adapter.is_spam());
    adapter.add_action(Action::keep());
    adapter.execute_actions().unwrap();
    assert_eq!(vec![ID_FOLDER_INBOX], folder_ids(&adapter));

    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector);
    adapter.add_action(Action::implicit_keep());
    adapter.execute_actions().unwrap();
    assert_eq!(vec![ID_FOLDER_SPAM], folder_ids(&adapter));
}

#[test]
fn test_file_into_local_folders() {
    init_logger();

    let mbox = MemoryMailbox::new("bob");
    let work = mbox.create_folder("/Work").unwrap();
    let projects = mbox.create_folder("/Work/Projects").unwrap();
    let msg = plain_message();
    let detector = spam_detector();

    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector);
    adapter.set_actions(vec![
        Action::file_into("/Work"),
        Action::file_into("work/projects"),
        Action::file_into("/Work/Archive/2022"),
        Action::file_into("Unknown"),
    ]);
    adapter.execute_actions().unwrap();

    assert_eq!(
        vec![work.id, projects.id, ID_FOLDER_INBOX, ID_FOLDER_INBOX],
        folder_ids(&adapter)
    );

    // nothing got created along the way
    assert!(mbox
        .get_folder_by_path_longest_match(1, "/Work/Archive")
        .unwrap()
        .is_partial());
}

#[test]
fn test_redirect() {
    init_logger();

    let mbox = MemoryMailbox::new("bob");
    let msg = plain_message();
    let detector = spam_detector();
    let sent = RefCell::new(Vec::new());

    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector)
        .sender(RecordingSender(&sent));
    adapter.set_actions(vec![Action::redirect("\"Carol\" <carol@localhost>")]);
    assert!(adapter.execute_actions().unwrap().is_empty());

    let sent = sent.borrow();
    assert_eq!(1, sent.len());
    assert_eq!("carol@localhost", sent[0].0);
    let redirected = ParsedMessage::from_bytes(sent[0].1.clone()).unwrap();
    assert_eq!(Some("1.0".into()), redirected.header("MIME-Version"));
    assert_eq!(msg.message_id(), redirected.message_id());
    assert_eq!(msg.header("Date"), redirected.header("Date"));
}

#[test]
fn test_redirect_failure() {
    init_logger();

    let mbox = MemoryMailbox::new("bob");
    let msg = plain_message();
    let detector = spam_detector();

    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector)
        .sender(FailingSender);
    adapter.set_actions(vec![
        Action::redirect("carol@localhost"),
        Action::file_into("/Trash"),
    ]);
    adapter.execute_actions().unwrap();
    assert_eq!(vec![ID_FOLDER_INBOX, 3], folder_ids(&adapter));

    // redirect to an invalid address
    let sent = RefCell::new(Vec::new());
    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector)
        .sender(RecordingSender(&sent));
    adapter.set_actions(vec![Action::redirect("carol")]);
    adapter.execute_actions().unwrap();
    assert_eq!(vec![ID_FOLDER_INBOX], folder_ids(&adapter));
    assert!(sent.borrow().is_empty());
}

#[test]
fn test_flags_last_action_wins() {
    init_logger();

    let mbox = MemoryMailbox::new("bob");
    let msg = plain_message();
    let detector = spam_detector();

    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector);
    adapter.set_actions(vec![
        Action::clear_flag(FLAG_UNREAD),
        Action::set_flag(FLAG_FLAGGED),
        Action::keep(),
        Action::clear_flag(FLAG_FLAGGED),
        Action::set_flag(-42),
    ]);
    let stored = adapter.execute_actions().unwrap();
    assert_eq!(1, stored.len());
    assert_eq!(0, stored[0].flags);
}

#[test]
fn test_duplicate_delivery() {
    init_logger();

    let mbox = MemoryMailbox::new("bob");
    let work = mbox.create_folder("/Work").unwrap();
    let msg = plain_message();
    let detector = spam_detector();
    let ctx = SharedDeliveryContext::new();

    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", Some(&ctx), &detector);
    adapter.add_action(Action::keep());
    assert_eq!(1, adapter.execute_actions().unwrap().len());
    assert!(!adapter.is_duplicate());

    // the retry stops on the first duplicate
    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", Some(&ctx), &detector);
    adapter.set_actions(vec![Action::keep(), Action::file_into("/Work")]);
    assert!(adapter.execute_actions().unwrap().is_empty());
    assert!(adapter.is_duplicate());
    assert_eq!(DeliveryState::Done, adapter.state());
    assert!(mbox.messages_in(work.id).unwrap().is_empty());

    // another recipient of the same fan-out still gets its copy
    let mut adapter = MailAdapter::new(&mbox, &msg, "carol@localhost", Some(&ctx), &detector);
    adapter.add_action(Action::keep());
    assert_eq!(1, adapter.execute_actions().unwrap().len());
}

#[test]
fn test_idn_headers() {
    init_logger();

    let mbox = MemoryMailbox::new("bob");
    let msg = spam_message();
    let detector = spam_detector();
    let adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector);

    assert_eq!(
        vec!["promo@bücher.example", "promo@xn--bcher-kva.example"],
        adapter.header("From")
    );
    assert_eq!(vec!["bob@localhost"], adapter.header("to"));
    assert_eq!(vec!["Cheap books"], adapter.header("subject"));
}

#[test]
fn test_file_into_mountpoints() {
    init_logger();

    let mbox = MemoryMailbox::new("bob").with_auth_token("bob-token");
    let shared = mbox.create_mountpoint("/Shared", "alice", 257).unwrap();
    let msg = plain_message();
    let detector = spam_detector();

    let remote = FakeRemote {
        paths: vec!["Shared".into(), "Shared/Projects".into()],
        mounts: HashMap::from_iter([(ItemId::new("alice", 257), "Shared".into())]),
        ..FakeRemote::default()
    };

    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector)
        .remote_connector(&remote);
    adapter.set_actions(vec![
        Action::set_flag(FLAG_FLAGGED),
        Action::file_into("/Shared"),
        Action::file_into("/Shared/Projects"),
        Action::file_into("/Shared/Missing"),
    ]);
    adapter.execute_actions().unwrap();

    // only the missing subfolder falls back to the Inbox
    assert_eq!(vec![ID_FOLDER_INBOX], folder_ids(&adapter));
    assert!(mbox.messages_in(shared.id).unwrap().is_empty());

    let appended = remote.appended.borrow();
    assert_eq!(
        vec!["Shared", "Shared/Projects"],
        appended
            .iter()
            .map(|(path, _, _)| path.as_str())
            .collect::<Vec<_>>()
    );
    assert_eq!(Flags::from_iter([Flag::Flagged]), appended[0].1);
    assert_eq!(msg.raw(), appended[0].2.as_slice());
    assert_eq!(
        ("bob-token".to_owned(), "alice".to_owned()),
        remote.tokens.borrow()[0]
    );
}

#[test]
fn test_file_into_mountpoints_fallbacks() {
    init_logger();

    let msg = plain_message();
    let detector = spam_detector();

    // unknown remote folder
    let mbox = MemoryMailbox::new("bob").with_auth_token("bob-token");
    mbox.create_mountpoint("/Shared", "alice", 257).unwrap();
    let remote = FakeRemote::default();
    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector)
        .remote_connector(&remote);
    adapter.add_action(Action::file_into("/Shared"));
    adapter.execute_actions().unwrap();
    assert_eq!(vec![ID_FOLDER_INBOX], folder_ids(&adapter));

    // authentication failure
    let remote = FakeRemote {
        reject_auth: true,
        ..FakeRemote::default()
    };
    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector)
        .remote_connector(&remote);
    adapter.add_action(Action::file_into("/Shared"));
    adapter.execute_actions().unwrap();
    assert_eq!(vec![ID_FOLDER_INBOX], folder_ids(&adapter));

    // no remote connector
    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector);
    adapter.add_action(Action::file_into("/Shared"));
    adapter.execute_actions().unwrap();
    assert_eq!(vec![ID_FOLDER_INBOX], folder_ids(&adapter));

    // no auth token
    let mbox = MemoryMailbox::new("bob");
    mbox.create_mountpoint("/Shared", "alice", 257).unwrap();
    let remote = FakeRemote::default();
    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector)
        .remote_connector(&remote);
    adapter.add_action(Action::file_into("/Shared/Projects"));
    adapter.execute_actions().unwrap();
    assert_eq!(vec![ID_FOLDER_INBOX], folder_ids(&adapter));
    assert!(remote.tokens.borrow().is_empty());
}

#[test]
fn test_delivery_errors_propagate() -> sieve_delivery_lib::Result<()> {
    init_logger();

    let mbox = MemoryMailbox::new("bob");
    let msg = plain_message();
    let detector = SpamDetector::default();

    let mut adapter = MailAdapter::new(&mbox, &msg, "bob@localhost", None, &detector);
    adapter.add_action(Action::keep());
    assert_eq!(1, adapter.execute_actions()?.len());

    Ok(())
}
