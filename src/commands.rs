//! Command table
//!
//! Exact command text mapped to a producer of response text. No prefix
//! matching, argument parsing or case folding: `"docker ps"` matches and
//! `"docker  ps"` does not.
//!
//! `clear` and `exit` never live here; the dispatcher owns them.

use crate::config::{DOWNLOAD_MIME, DownloadOptions, DownloadScope};
use crate::platform::TerminalView;
use std::collections::HashMap;

/// A command's response producer.
///
/// Producers get the view so `download` can read it back; the text
/// producers ignore it.
pub type Producer = Box<dyn Fn(&mut dyn TerminalView) -> String>;

/// Confirmation printed after a successful `download`
pub const DOWNLOAD_STARTED: &str = "جاري تحميل محتوى المحاكي...";

const HELP: &str = "
    المساعدة المتوفرة:
    
    الأوامر السحابية (Google Cloud):
    gcloud config list     - عرض إعدادات الحساب
    gcloud projects list   - عرض المشاريع
    gcloud compute instances list - عرض قائمة الخوادم
    gcloud compute instances create - إنشاء خادم جديد
    gcloud compute instances delete - حذف خادم
    gcloud compute instances start  - تشغيل خادم
    gcloud compute instances stop   - إيقاف خادم
    gcloud compute ssh              - الاتصال بالخادم عبر SSH
    gcloud storage ls               - عرض ملفات التخزين
    gcloud storage cp               - نسخ ملفات
    
    أوامر Docker:
    docker ps             - عرض الحاويات النشطة
    docker images         - عرض الصور المتوفرة
    docker build          - بناء صورة جديدة
    docker run            - تشغيل حاوية
    docker stop           - إيقاف حاوية
    docker rm             - حذف حاوية
    docker rmi            - حذف صورة
    docker pull           - تحميل صورة
    docker push           - رفع صورة
    docker exec           - تنفيذ أمر في حاوية
    
    أوامر Git:
    git init             - إنشاء مستودع جديد
    git clone            - نسخ مستودع
    git status           - عرض حالة المستودع
    git add              - إضافة ملفات للمتابعة
    git commit           - حفظ التغييرات
    git push             - رفع التغييرات
    git pull             - تحديث المستودع المحلي
    git branch           - إدارة الفروع
    git checkout         - التبديل بين الفروع
    git merge            - دمج الفروع
    
    أوامر عامة:
    clear               - مسح الشاشة
    exit                - خروج
    help                - عرض هذه المساعدة
    download            - تحميل محتوى المحاكي
  ";

const GCLOUD_CONFIG_LIST: &str = "
    [core]
    account = user@example.com
    project = my-cloud-project
    region = us-central1
    zone = us-central1-a
  ";

const GCLOUD_PROJECTS_LIST: &str = "
    PROJECT_ID          NAME                PROJECT_NUMBER
    my-cloud-project    مشروع تجريبي       123456789
    test-project       مشروع اختباري      987654321
  ";

const GCLOUD_INSTANCES_LIST: &str = "
    NAME          ZONE           MACHINE_TYPE  STATUS
    instance-1    us-central1-a  e2-medium    RUNNING
    instance-2    us-central1-b  e2-small     STOPPED
  ";

const DOCKER_PS: &str = "
    CONTAINER ID   IMAGE          COMMAND       STATUS        PORTS
    abc123def456   nginx:latest   \"/docker-…\"   Up 2 hours    80/tcp
    def456abc789   redis:latest   \"redis-…\"     Up 5 hours    6379/tcp
  ";

const DOCKER_IMAGES: &str = "
    REPOSITORY    TAG       IMAGE ID       CREATED        SIZE
    nginx         latest    ad4c705f24d2   2 weeks ago    187MB
    redis         latest    621ceef7494a   3 weeks ago    117MB
  ";

const GIT_STATUS: &str = "
    On branch main
    Your branch is up to date with 'origin/main'.
    
    Changes not staged for commit:
      modified:   src/App.tsx
  ";

/// Registry of canned commands
pub struct CommandTable {
    commands: HashMap<String, Producer>,
}

impl CommandTable {
    /// The built-in table with default download settings
    pub fn new() -> Self {
        Self::with_download(DownloadOptions::default())
    }

    /// The built-in table
    pub fn with_download(options: DownloadOptions) -> Self {
        let mut table = Self::empty();

        table.register_text("help", HELP);
        table.register_text("gcloud config list", GCLOUD_CONFIG_LIST);
        table.register_text("gcloud projects list", GCLOUD_PROJECTS_LIST);
        table.register_text("gcloud compute instances list", GCLOUD_INSTANCES_LIST);
        table.register_text("docker ps", DOCKER_PS);
        table.register_text("docker images", DOCKER_IMAGES);
        table.register_text("git status", GIT_STATUS);
        table.register("download", move |view| download(view, &options));

        table
    }

    /// A table with no commands at all
    pub fn empty() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: &str, producer: F)
    where
        F: Fn(&mut dyn TerminalView) -> String + 'static,
    {
        self.commands.insert(name.to_string(), Box::new(producer));
    }

    /// Register a command that always answers with `text`
    pub fn register_text(&mut self, name: &str, text: &'static str) {
        self.register(name, move |_| text.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&Producer> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Run `name` against `view`, if it exists
    pub fn run(&self, name: &str, view: &mut dyn TerminalView) -> Option<String> {
        self.get(name).map(|producer| producer(view))
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.commands.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

/// download - hand the terminal text to the user as a file
fn download(view: &mut dyn TerminalView, options: &DownloadOptions) -> String {
    let contents = match options.scope {
        DownloadScope::FirstLine => view.line(0).unwrap_or_default(),
        DownloadScope::Scrollback => {
            let mut lines: Vec<String> =
                (0..view.line_count()).filter_map(|i| view.line(i)).collect();
            // Blank rows below the cursor
            while lines.last().is_some_and(|l| l.is_empty()) {
                lines.pop();
            }
            lines.join("\n")
        }
    };

    match view.save_file(&options.filename, DOWNLOAD_MIME, &contents) {
        Ok(()) => {
            crate::console_log!("[download] {} ({} bytes)", options.filename, contents.len());
            DOWNLOAD_STARTED.to_string()
        }
        Err(e) => {
            crate::console_log!("[download] failed: {}", e);
            format!("خطأ: تعذر تحميل محتوى المحاكي ({})", e)
        }
    }
}
