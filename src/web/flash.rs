use tower_sessions::Session;

use crate::error::PicstoryError;

const FLASH_FLAG_KEY: &str = "flash_flag";

pub(crate) const FLASH_MISSING_IMAGE: u16 = 1;
pub(crate) const FLASH_MISSING_PROMPT: u16 = 2;
pub(crate) const FLASH_UNREADABLE_IMAGE: u16 = 3;
pub(crate) const FLASH_HISTORY_CLEARED: u16 = 4;

#[derive(Clone, Debug)]
pub(crate) struct FlashMessage {
    pub(crate) text: &'static str,
    pub(crate) class: &'static str,
}

pub(crate) async fn set_flash(session: &Session, flag: u16) -> Result<(), PicstoryError> {
    session.insert(FLASH_FLAG_KEY, flag).await?;
    Ok(())
}

pub(crate) async fn take_flash_message(
    session: &Session,
) -> Result<Option<FlashMessage>, PicstoryError> {
    let flag = session
        .get::<u16>(FLASH_FLAG_KEY)
        .await?
        .filter(|flag| *flag != 0);
    if flag.is_some() {
        session.insert(FLASH_FLAG_KEY, 0u16).await?;
    }
    Ok(flag.and_then(message_for))
}

fn message_for(flag: u16) -> Option<FlashMessage> {
    match flag {
        FLASH_MISSING_IMAGE => Some(FlashMessage {
            text: "Please upload an image first.",
            class: "warning",
        }),
        FLASH_MISSING_PROMPT => Some(FlashMessage {
            text: "Please write a prompt before generating.",
            class: "warning",
        }),
        FLASH_UNREADABLE_IMAGE => Some(FlashMessage {
            text: "Could not read the image. Try another file.",
            class: "error",
        }),
        FLASH_HISTORY_CLEARED => Some(FlashMessage {
            text: "History cleared.",
            class: "success",
        }),
        _ => None,
    }
}
